use anyhow::Result;
use serde::Serialize;
use sift_core::{DocId, QuerySession, ScoredDoc};
use std::io::{BufRead, Write};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Boolean,
    Vector,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub terms: Vec<String>,
    pub mode: Mode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Debug, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Bind `text` to the session and evaluate it in `mode`.
pub fn answer(session: &mut QuerySession, text: &str, mode: Mode, k: usize) -> Result<QueryResponse> {
    let start = Instant::now();
    let terms = session.load_query(text).terms().to_vec();
    let hits: Vec<(DocId, Option<f64>)> = match mode {
        Mode::Boolean => session.boolean_query()?.into_iter().map(|id| (id, None)).collect(),
        Mode::Vector => session
            .vector_query(k)?
            .into_iter()
            .map(|ScoredDoc { doc_id, score }| (doc_id, Some(score)))
            .collect(),
    };

    let docs = session.processor().collection();
    let results: Vec<Hit> = hits
        .into_iter()
        .map(|(doc_id, score)| Hit { doc_id, score, title: docs.find(doc_id).map(|d| d.title.clone()) })
        .collect();
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query = text, hits = results.len(), took_s, "answered query");
    Ok(QueryResponse { query: text.to_string(), terms, mode, took_s, total_hits: results.len(), results })
}

/// Answer one query per non-empty input line, writing one JSON object per line.
pub fn run<R: BufRead, W: Write>(session: &mut QuerySession, input: R, mut out: W, mode: Mode, k: usize) -> Result<usize> {
    let mut answered = 0;
    for line in input.lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let response = answer(session, text, mode, k)?;
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
        answered += 1;
    }
    out.flush()?;
    Ok(answered)
}
