use serde::{Deserialize, Serialize};

/// Upper bound the submission form enforces on the `name` input, in characters.
pub const NAME_MAX_LEN: usize = 100;

/// One user-provided record captured from the submission form.
///
/// A submission is created once, at modal-submission time, and never updated
/// or deleted afterwards. The store keeps it as a single delimited row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub body: String,
    pub author_id: String,
    pub author_name: String,
}

impl Submission {
    /// Build a submission from raw form fields.
    ///
    /// The input surface marks both fields required, but a malformed payload
    /// must not crash the handler: absent values are coerced to the empty
    /// string and persisted as-is.
    pub fn from_form(
        name: Option<String>,
        body: Option<String>,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.unwrap_or_default(),
            body: body.unwrap_or_default(),
            author_id: author_id.into(),
            author_name: author_name.into(),
        }
    }

    /// Whether the platform-side form constraints actually held for this
    /// record: both fields present, name within its declared bound.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && self.name.chars().count() <= NAME_MAX_LEN
            && !self.body.is_empty()
    }
}
