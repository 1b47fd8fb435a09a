//! Top-level GraphQL error reporting
//!
//! The endpoint answers HTTP 200 even when a query is rejected (expired
//! session, bad variables) and lists the reasons under `errors`.

use serde::Deserialize;

use crate::utils::error::FetchError;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

/// Turn a non-empty `errors` array into [`FetchError::Decode`]
pub(crate) fn check_errors(
    operation: &str,
    errors: Option<Vec<GraphQlError>>,
) -> Result<(), FetchError> {
    let errors = errors.unwrap_or_default();
    if errors.is_empty() {
        return Ok(());
    }

    let messages: Vec<&str> = errors
        .iter()
        .map(|e| e.message.as_str())
        .filter(|m| !m.is_empty())
        .collect();
    let detail = if messages.is_empty() {
        format!("{} unnamed error(s)", errors.len())
    } else {
        messages.join("; ")
    };

    Err(FetchError::Decode(format!("{operation} rejected: {detail}")))
}
