//! Input checks shared by the request layer.

use thiserror::Error;

/// Whether `s` holds only ASCII letters, digits and `-`. The empty string
/// passes.
#[must_use]
pub fn is_alphanumeric_with_hyphen(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid id")]
pub struct ParseIdListError {
    pub value: String,
}

/// Parse a comma-separated id list such as `1,2,3`.
///
/// Surrounding whitespace around each element is ignored.
///
/// # Errors
/// Returns [`ParseIdListError`] for the first element that isn't an integer,
/// including empty elements (`1,,2`).
pub fn parse_id_list(raw: &str) -> Result<Vec<i32>, ParseIdListError> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<i32>().map_err(|_| ParseIdListError {
                value: part.to_owned(),
            })
        })
        .collect()
}
