//! JSON document persistence.
//!
//! Content definitions and the layers document are small JSON documents that
//! are rewritten whole. Writes go to a temp file in the target directory, are
//! synced, and are renamed over the target so readers never see a partial
//! document.

use crate::{Result, TermIndexError};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and parse a JSON document.
///
/// Returns `None` if the file doesn't exist, or an error if parsing fails.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TermIndexError::io_with_path(e, path)),
    };

    let data = serde_json::from_str(&contents).map_err(|e| TermIndexError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write a JSON document atomically, creating parent directories as needed.
pub fn write_document<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| TermIndexError::io_with_path(e, parent))?;

    let serialized = serde_json::to_string_pretty(data)?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| TermIndexError::io_with_path(e, parent))?;
    temp.write_all(serialized.as_bytes())
        .map_err(|e| TermIndexError::io_with_path(e, temp.path()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| TermIndexError::io_with_path(e, temp.path()))?;

    temp.persist(path).map_err(|e| TermIndexError::Io {
        message: format!("Failed to replace {}", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e.error),
    })?;

    debug!("Wrote document {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        name: String,
        layers: Vec<String>,
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        let doc = Doc {
            name: "layers".into(),
            layers: vec!["Homepage".into()],
        };
        write_document(&path, &doc).unwrap();

        let loaded: Option<Doc> = read_document(&path).unwrap();
        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn test_read_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Option<Doc> = read_document(&temp_dir.path().join("missing.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_corrupt_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<Doc>> = read_document(&path);
        assert!(matches!(result, Err(TermIndexError::Json { .. })));
    }

    #[test]
    fn test_write_creates_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("doc.json");

        write_document(&path, &Doc { name: "a".into(), layers: vec![] }).unwrap();
        write_document(&path, &Doc { name: "b".into(), layers: vec![] }).unwrap();

        let loaded: Option<Doc> = read_document(&path).unwrap();
        assert_eq!(loaded.unwrap().name, "b");
    }
}
