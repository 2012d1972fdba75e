//! Record Store - append-only persistence for form submissions
//!
//! Submissions are kept as one quoted, comma-delimited row per record
//! (`record`), either on disk (`file`) or in memory for tests and tooling
//! (`memory`). Writes preserve arrival order; there is no update or delete.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use formbot_core::Submission;

pub mod file;
pub mod memory;
pub mod record;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use record::{decode_row, encode_row, split_records, RecordError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store io failure at `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Durable, ordered persistence for submissions.
///
/// `append` writes one record; `preview_first_lines` reads back up to
/// `max_lines` of the earliest records as raw row strings. A store that
/// does not exist yet previews as empty rather than failing.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn append(&self, submission: &Submission) -> Result<(), StoreError>;
    async fn preview_first_lines(&self, max_lines: usize) -> Result<Vec<String>, StoreError>;
}
