use crate::error::{Result, SiftError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub body: String,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id, title: title.into(), author: author.into(), body: body.into() }
    }

    /// Text fed to the normalizer at index time: title and body, optionally followed by the author.
    pub fn indexable_text(&self, include_author: bool) -> String {
        if include_author && !self.author.is_empty() {
            format!("{} {} {}", self.title, self.body, self.author)
        } else {
            format!("{} {}", self.title, self.body)
        }
    }
}

/// Corpus files may carry IDs as numbers or as numeric strings ("0042").
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(DocId),
    Text(String),
}

#[derive(Deserialize)]
struct InputDoc {
    id: RawId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    body: String,
}

impl TryFrom<InputDoc> for Document {
    type Error = SiftError;

    fn try_from(doc: InputDoc) -> Result<Self> {
        let id = match doc.id {
            RawId::Num(n) => n,
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| SiftError::Deserialization(format!("document id is not numeric: {s:?}")))?,
        };
        Ok(Document { id, title: doc.title, author: doc.author, body: doc.body })
    }
}

/// The raw document set, keyed and iterated by ascending document ID.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    docs: BTreeMap<DocId, Document>,
}

impl Collection {
    pub fn new() -> Self { Self::default() }

    /// Inserts a document, returning the previous one with the same ID.
    pub fn insert(&mut self, doc: Document) -> Option<Document> {
        self.docs.insert(doc.id, doc)
    }

    pub fn find(&self, id: DocId) -> Option<&Document> { self.docs.get(&id) }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Document> { self.docs.values() }

    /// Loads every `.json`/`.jsonl` file under `path` (a file or a directory).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut files: Vec<PathBuf> = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                    files.push(p.to_path_buf());
                }
            }
        } else {
            files.push(path.to_path_buf());
        }

        let mut collection = Collection::new();
        for file in files {
            let before = collection.len();
            if extension(&file) == Some("jsonl") {
                collection.load_jsonl(&file)?;
            } else {
                collection.load_json(&file)?;
            }
            tracing::debug!(file = %file.display(), docs = collection.len() - before, "loaded corpus file");
        }
        tracing::info!(docs = collection.len(), "collection loaded");
        Ok(collection)
    }

    fn load_jsonl(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let doc: InputDoc = serde_json::from_str(&line)
                .map_err(|e| SiftError::Deserialization(format!("{}:{}: {e}", file.display(), lineno + 1)))?;
            self.insert(doc.try_into()?);
        }
        Ok(())
    }

    fn load_json(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        let json: serde_json::Value = serde_json::from_reader(reader)
            .map_err(|e| SiftError::Deserialization(format!("{}: {e}", file.display())))?;
        let values = match json {
            serde_json::Value::Array(arr) => arr,
            obj @ serde_json::Value::Object(_) => vec![obj],
            _ => return Err(SiftError::Deserialization(format!("{}: expected an object or an array", file.display()))),
        };
        for v in values {
            let doc: InputDoc = serde_json::from_value(v)
                .map_err(|e| SiftError::Deserialization(format!("{}: {e}", file.display())))?;
            self.insert(doc.try_into()?);
        }
        Ok(())
    }
}

impl FromIterator<Document> for Collection {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut c = Collection::new();
        for doc in iter { c.insert(doc); }
        c
    }
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn indexable_text_respects_author_flag() {
        let doc = Document::new(1, "Wing flutter", "smith", "experimental study");
        assert_eq!(doc.indexable_text(false), "Wing flutter experimental study");
        assert_eq!(doc.indexable_text(true), "Wing flutter experimental study smith");
    }

    #[test]
    fn loads_json_and_jsonl_with_string_ids() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"id": 2, "title": "b", "body": "second"}, {"id": "0001", "title": "a", "body": "first"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"id\": 3, \"title\": \"c\", \"author\": \"x\", \"body\": \"third\"}\n\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let c = Collection::load(dir.path()).unwrap();
        assert_eq!(c.len(), 3);
        let ids: Vec<DocId> = c.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(c.find(3).unwrap().author, "x");
        assert!(c.find(9).is_none());
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"{"id": "abc", "title": "t", "body": "b"}"#).unwrap();
        assert!(matches!(Collection::load(&file), Err(SiftError::Deserialization(_))));
    }
}
