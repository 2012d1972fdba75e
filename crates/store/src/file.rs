use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use formbot_core::Submission;

use crate::record::{encode_row, split_records};
use crate::{StoreError, SubmissionStore};

/// Flat-file store: one quoted row per submission, appended in arrival order.
///
/// The file is created on first append. Reads never require it to exist.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

#[async_trait]
impl SubmissionStore for FileStore {
    async fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        let mut row = encode_row(submission);
        row.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(row.as_bytes()).await.map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))?;

        Ok(())
    }

    async fn preview_first_lines(&self, max_lines: usize) -> Result<Vec<String>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        Ok(split_records(&raw).into_iter().take(max_lines).collect())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use formbot_core::Submission;

    use super::FileStore;
    use crate::record::encode_row;
    use crate::SubmissionStore;

    fn submission(name: &str, body: &str) -> Submission {
        Submission {
            name: name.to_string(),
            body: body.to_string(),
            author_id: "1234567890".to_string(),
            author_name: "ada".to_string(),
        }
    }

    #[tokio::test]
    async fn preview_of_missing_file_is_empty_not_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path().join("submissions.csv"));

        let rows = store.preview_first_lines(10).await.expect("preview");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn append_then_preview_returns_earliest_rows_in_order() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path().join("submissions.csv"));

        for index in 1..=3 {
            store
                .append(&submission(&format!("name-{index}"), "body"))
                .await
                .expect("append");
        }

        let rows = store.preview_first_lines(2).await.expect("preview");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], encode_row(&submission("name-1", "body")));
        assert_eq!(rows[1], encode_row(&submission("name-2", "body")));

        let all = store.preview_first_lines(10).await.expect("preview");
        assert_eq!(all.len(), 3, "preview is bounded by the stored count");
    }

    #[tokio::test]
    async fn rows_survive_reopening_the_store() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("submissions.csv");

        FileStore::new(&path).append(&submission("Ada", "Hi, \"world\"")).await.expect("append");

        let reopened = FileStore::new(&path);
        let rows = reopened.preview_first_lines(10).await.expect("preview");
        assert_eq!(rows, vec![r#""Ada","Hi, ""world""","1234567890","ada""#.to_string()]);
    }

    #[tokio::test]
    async fn multiline_bodies_preview_as_single_records() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path().join("submissions.csv"));

        store.append(&submission("multi", "line one\nline two")).await.expect("append");
        store.append(&submission("plain", "body")).await.expect("append");

        let rows = store.preview_first_lines(10).await.expect("preview");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("line one\nline two"));
    }
}
