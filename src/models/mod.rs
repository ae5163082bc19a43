//! Rows of the remote tables and the payloads written to them

mod apartment;
mod cleaner;
mod task;
mod user;

pub use apartment::*;
pub use cleaner::*;
pub use task::*;
pub use user::*;

/// Trimmed text, or `None` when blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trimmed text, failing with a validation error naming the field when blank
pub(crate) fn required(value: &str, field: &str) -> crate::error::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::Error::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
