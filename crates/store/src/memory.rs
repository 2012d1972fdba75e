use async_trait::async_trait;
use tokio::sync::Mutex;

use formbot_core::Submission;

use crate::record::encode_row;
use crate::{StoreError, SubmissionStore};

/// Ordered in-memory store. Substitutes for [`crate::FileStore`] in tests
/// and local tooling; rows are held exactly as they would be written.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows(&self) -> Vec<String> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        self.rows.lock().await.push(encode_row(submission));
        Ok(())
    }

    async fn preview_first_lines(&self, max_lines: usize) -> Result<Vec<String>, StoreError> {
        Ok(self.rows.lock().await.iter().take(max_lines).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use formbot_core::Submission;

    use super::InMemoryStore;
    use crate::SubmissionStore;

    #[tokio::test]
    async fn keeps_rows_in_append_order() {
        let store = InMemoryStore::new();

        for name in ["first", "second", "third"] {
            store
                .append(&Submission {
                    name: name.to_string(),
                    body: "body".to_string(),
                    author_id: "U1".to_string(),
                    author_name: "ada".to_string(),
                })
                .await
                .expect("append");
        }

        let rows = store.preview_first_lines(2).await.expect("preview");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("\"first\""));
        assert!(rows[1].starts_with("\"second\""));
    }
}
