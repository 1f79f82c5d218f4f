//! Loading documents from JSON / JSONL files.

use crate::document::{DocumentId, DocumentStatus, Rating};
use crate::error::Result;
use crate::index::SearchIndex;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputDoc {
    pub id: DocumentId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

/// Read documents from a `.json` file (an array or a single object), a
/// `.jsonl` file (one object per line), or a directory searched recursively
/// for such files in path order.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<InputDoc>> {
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

    let mut docs = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    tracing::info!(path = %path.display(), docs = docs.len(), "loaded corpus");
    Ok(docs)
}

/// Add `docs` in order, stopping at the first rejected document.
pub fn index_all(index: &mut SearchIndex, docs: &[InputDoc]) -> Result<()> {
    for doc in docs {
        index.add_document(doc.id, &doc.text, doc.status, &doc.ratings)?;
    }
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_jsonl_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("docs.jsonl");
        fs::write(
            &file,
            "{\"id\": 1, \"text\": \"white cat\", \"ratings\": [1, 2]}\n\n{\"id\": 2, \"text\": \"dog\", \"status\": \"BANNED\"}\n",
        )
        .unwrap();
        let docs = load(&file).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].status, DocumentStatus::Actual);
        assert_eq!(docs[1].status, DocumentStatus::Banned);
        assert!(docs[1].ratings.is_empty());
    }

    #[test]
    fn walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "[{\"id\": 1, \"text\": \"cat\"}]").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.json"), "{\"id\": 2, \"text\": \"dog\"}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load(dir.path()).unwrap();
        let mut index = SearchIndex::new();
        index_all(&mut index, &docs).unwrap();
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn bad_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        fs::write(&file, "[{\"id\": \"x\"}]").unwrap();
        assert!(matches!(load(&file), Err(crate::SearchError::Json(_))));
    }
}
