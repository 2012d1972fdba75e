use thiserror::Error;

use formbot_core::Submission;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has {found} fields, expected 4")]
    FieldCount { found: usize },
    #[error("malformed quoting at byte {position}")]
    Quoting { position: usize },
}

/// Encode one submission as a single store row.
///
/// Field order is fixed (`name,body,author_id,author_name`); every field is
/// wrapped in double quotes with internal quotes doubled, so values holding
/// commas, quotes, or newlines round-trip losslessly.
pub fn encode_row(submission: &Submission) -> String {
    [
        submission.name.as_str(),
        submission.body.as_str(),
        submission.author_id.as_str(),
        submission.author_name.as_str(),
    ]
    .iter()
    .map(|field| quote_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Decode one store row back into a submission.
pub fn decode_row(row: &str) -> Result<Submission, RecordError> {
    let mut fields = parse_fields(row)?;
    if fields.len() != 4 {
        return Err(RecordError::FieldCount { found: fields.len() });
    }

    let author_name = fields.pop().unwrap_or_default();
    let author_id = fields.pop().unwrap_or_default();
    let body = fields.pop().unwrap_or_default();
    let name = fields.pop().unwrap_or_default();

    Ok(Submission { name, body, author_id, author_name })
}

/// Split raw store contents into logical records.
///
/// A record whose fields contain newlines spans multiple physical lines, so
/// boundaries are only taken at newlines outside quoted fields. Blank
/// trailing lines are dropped.
pub fn split_records(raw: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in raw.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '\n' if !in_quotes => {
                if !current.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}

fn parse_fields(row: &str) -> Result<Vec<String>, RecordError> {
    let bytes = row.as_bytes();
    let mut fields = Vec::new();
    let mut position = 0usize;

    loop {
        if bytes.get(position) != Some(&b'"') {
            return Err(RecordError::Quoting { position });
        }
        position += 1;

        let mut field = String::new();
        loop {
            match bytes.get(position) {
                Some(b'"') if bytes.get(position + 1) == Some(&b'"') => {
                    field.push('"');
                    position += 2;
                }
                Some(b'"') => {
                    position += 1;
                    break;
                }
                Some(_) => {
                    // Advance one character, not one byte.
                    let rest = &row[position..];
                    let ch = rest.chars().next().ok_or(RecordError::Quoting { position })?;
                    field.push(ch);
                    position += ch.len_utf8();
                }
                None => return Err(RecordError::Quoting { position }),
            }
        }
        fields.push(field);

        match bytes.get(position) {
            Some(b',') => position += 1,
            None => return Ok(fields),
            Some(_) => return Err(RecordError::Quoting { position }),
        }
    }
}
