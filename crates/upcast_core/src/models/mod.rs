//! Data models for API requests and persistence.

/// Category models.
pub mod category;
/// Comment models.
pub mod comment;
/// Creator profile models.
pub mod creator;
/// Notification models.
pub mod notification;
/// Project models.
pub mod project;
/// User models.
pub mod user;
/// Mini-app webhook event models.
pub mod webhook;


/// Trim a required text field, rejecting blank values.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, crate::AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Normalize optional text: blank values are treated as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Reject values longer than `max` characters.
pub(crate) fn check_len(value: &str, max: usize, field: &str) -> Result<(), crate::AppError> {
    if value.chars().count() > max {
        return Err(crate::AppError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
