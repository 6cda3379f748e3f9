use crate::error::{Result, SiftError};
use crate::index::InvertedIndex;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

/// Leading bytes of every snapshot file.
const SNAPSHOT_MAGIC: &[u8; 4] = b"SIFT";
/// Bumped whenever the serialized layout of [`InvertedIndex`] changes.
pub const SNAPSHOT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;
const FOOTER_LEN: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
    #[serde(default)]
    pub include_author: bool,
}

impl MetaFile {
    pub fn for_index(index: &InvertedIndex, created_at: String) -> Self {
        Self {
            num_docs: index.total_documents() as u32,
            num_terms: index.term_count() as u32,
            created_at,
            version: SNAPSHOT_VERSION,
            include_author: index.config().include_author,
        }
    }
}

/// File layout of an index directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn snapshot(&self) -> PathBuf { self.root.join("index.snapshot") }
    pub fn inspection(&self) -> PathBuf { self.root.join("index.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionTerm {
    pub document_frequency: usize,
    pub idf: f64,
    pub postings: BTreeMap<DocId, Vec<u32>>,
}

/// Human-readable view of an index. Not a reload format.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionIndex {
    pub total_documents: usize,
    pub terms: BTreeMap<String, InspectionTerm>,
}

impl InspectionIndex {
    pub fn from_index(index: &InvertedIndex) -> Self {
        let mut terms = BTreeMap::new();
        for term in index.sorted_terms() {
            let Some(item) = index.get(term) else { continue };
            let mut postings = BTreeMap::new();
            for (doc_id, posting) in item.postings_map() {
                let mut positions = posting.positions().to_vec();
                positions.sort_unstable();
                postings.insert(*doc_id, positions);
            }
            terms.insert(
                term.to_string(),
                InspectionTerm { document_frequency: item.document_frequency(), idf: index.idf(term), postings },
            );
        }
        Self { total_documents: index.total_documents(), terms }
    }
}

/// Write `bytes` to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

pub fn save_inspection(path: &Path, index: &InvertedIndex) -> Result<()> {
    let view = InspectionIndex::from_index(index);
    let json = serde_json::to_vec_pretty(&view).map_err(|e| SiftError::Serialization(e.to_string()))?;
    write_atomic(path, &json)?;
    tracing::info!(path = %path.display(), terms = view.terms.len(), "saved inspection index");
    Ok(())
}

pub fn load_inspection(path: &Path) -> Result<InspectionIndex> {
    let buf = fs::read(path)?;
    serde_json::from_slice(&buf).map_err(|e| SiftError::Deserialization(e.to_string()))
}

/// Snapshot layout: `SIFT`, version (u32 LE), bincode payload, CRC32 of the payload (u32 LE).
pub fn store_snapshot(path: &Path, index: &InvertedIndex) -> Result<()> {
    let payload = bincode::serialize(index).map_err(|e| SiftError::Serialization(e.to_string()))?;
    let crc = crc32fast::hash(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + FOOTER_LEN);
    out.extend_from_slice(SNAPSHOT_MAGIC);
    out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&crc.to_le_bytes());
    write_atomic(path, &out)?;

    tracing::info!(
        path = %path.display(),
        bytes = out.len(),
        crc = %format!("{crc:#010x}"),
        "stored index snapshot"
    );
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<InvertedIndex> {
    let raw = fs::read(path)?;
    let index = decode_snapshot(&raw)?;
    tracing::info!(
        path = %path.display(),
        docs = index.total_documents(),
        terms = index.term_count(),
        "loaded index snapshot"
    );
    Ok(index)
}

pub fn decode_snapshot(raw: &[u8]) -> Result<InvertedIndex> {
    if raw.len() < HEADER_LEN + FOOTER_LEN {
        return Err(SiftError::Deserialization(format!("snapshot truncated ({} bytes)", raw.len())));
    }
    if &raw[..4] != SNAPSHOT_MAGIC {
        return Err(SiftError::Deserialization("not an index snapshot (bad magic)".into()));
    }
    let version = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
    if version != SNAPSHOT_VERSION {
        return Err(SiftError::IncompatibleSnapshot { expected: SNAPSHOT_VERSION, actual: version });
    }

    let payload = &raw[HEADER_LEN..raw.len() - FOOTER_LEN];
    let tail = &raw[raw.len() - FOOTER_LEN..];
    let stored = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(SiftError::Deserialization(format!(
            "snapshot CRC32 mismatch: stored {stored:#010x}, computed {computed:#010x}"
        )));
    }

    let index: InvertedIndex = bincode::deserialize(payload).map_err(|e| SiftError::Deserialization(e.to_string()))?;
    index
        .validate()
        .map_err(|e| SiftError::Deserialization(format!("snapshot validation failed: {e}")))?;
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let json = serde_json::to_string_pretty(meta).map_err(|e| SiftError::Serialization(e.to_string()))?;
    write_atomic(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let buf = fs::read_to_string(paths.meta())?;
    serde_json::from_str(&buf).map_err(|e| SiftError::Deserialization(e.to_string()))
}

/// Persist everything the query side needs: snapshot, inspection JSON and meta.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, created_at: String) -> Result<MetaFile> {
    create_dir_all(&paths.root)?;
    store_snapshot(&paths.snapshot(), index)?;
    save_inspection(&paths.inspection(), index)?;
    let meta = MetaFile::for_index(index, created_at);
    save_meta(paths, &meta)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, Normalizer};

    fn sample() -> InvertedIndex {
        let n = Normalizer::new();
        let mut idx = InvertedIndex::new();
        idx.index_document(&Document::new(2, "wing", "", "flutter wing"), &n);
        idx.index_document(&Document::new(1, "shock", "", "wave"), &n);
        idx.sort();
        idx
    }

    #[test]
    fn snapshot_header_and_footer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.snapshot");
        store_snapshot(&path, &sample()).unwrap();
        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..4], b"SIFT");
        assert_eq!(u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]), SNAPSHOT_VERSION);
        assert!(!dir.path().join("x.snapshot.tmp").exists());
    }

    #[test]
    fn rejects_flipped_payload_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.snapshot");
        store_snapshot(&path, &sample()).unwrap();
        let mut raw = fs::read(&path).unwrap();
        raw[HEADER_LEN + 3] ^= 0xff;
        assert!(matches!(decode_snapshot(&raw), Err(SiftError::Deserialization(_))));
    }

    #[test]
    fn rejects_other_versions_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.snapshot");
        store_snapshot(&path, &sample()).unwrap();
        let mut raw = fs::read(&path).unwrap();
        raw[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            decode_snapshot(&raw),
            Err(SiftError::IncompatibleSnapshot { expected: SNAPSHOT_VERSION, actual: 7 })
        ));
        assert!(matches!(decode_snapshot(b"SIFT"), Err(SiftError::Deserialization(_))));
        assert!(matches!(decode_snapshot(b"JUNKJUNKJUNKJUNK"), Err(SiftError::Deserialization(_))));
    }

    #[test]
    fn inspection_layout() {
        let view = InspectionIndex::from_index(&sample());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["totalDocuments"], 2);
        let wing = &json["terms"]["wing"];
        assert_eq!(wing["documentFrequency"], 1);
        assert_eq!(wing["idf"], 0.301);
        assert_eq!(wing["postings"]["2"], serde_json::json!([0, 2]));
    }
}
