use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::NamedTempFile;

use crate::model::list::{StoreMeta, TaskList};
use crate::parse::{parse_document, serialize_document};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a todo store: missing the tasks heading")]
    MissingTasksSection,
    #[error("malformed record at line {line}: {text}")]
    Malformed { line: usize, text: String },
    #[error("invalid date `{0}`")]
    BadDate(String),
    #[error("task not found")]
    NotFound,
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Name of the account running the process. Falls back to `"unknown"` when
/// the environment gives no answer.
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Load a store from `path`.
///
/// A missing file yields an empty list without error; a malformed file fails
/// the whole load. Header fields absent from the file are substituted with
/// current process identity and current date.
pub fn load_store(path: &Path) -> Result<TaskList, StoreError> {
    if !path.exists() {
        return Ok(TaskList::new());
    }
    let text = fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let doc = parse_document(&text)?;
    let fallback = StoreMeta::now();
    let meta = StoreMeta {
        created_on: doc.header.created_on.unwrap_or(fallback.created_on),
        created_by: doc.header.created_by.unwrap_or(fallback.created_by),
        updated_at: doc.header.updated_at.unwrap_or(fallback.updated_at),
        updated_by: doc.header.updated_by.unwrap_or(fallback.updated_by),
    };

    let mut list = TaskList::with_meta(meta);
    list.replace_tasks(doc.tasks);
    Ok(list)
}

/// Save the store to `path`, refreshing the last-updated stamp first.
/// The write is a whole-file atomic overwrite.
pub fn save_store(path: &Path, list: &mut TaskList) -> Result<(), StoreError> {
    list.meta.updated_at = Local::now().naive_local();
    list.meta.updated_by = current_user();
    let content = serialize_document(&list.meta, list.tasks());
    atomic_write(path, content.as_bytes()).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write via a temp file in the same directory, then rename into place.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
