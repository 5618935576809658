use crate::error::{CoreError, CoreResult};

/// GitHub repository names: ASCII letters, digits, `-`, `_` and `.`, at most 100 chars.
pub fn validate_repo_name(name: &str) -> CoreResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationError(
            "Repository name cannot be empty".to_string(),
        ));
    }
    if name.len() > 100 {
        return Err(CoreError::ValidationError(
            "Repository name is longer than 100 characters".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(CoreError::ValidationError(format!(
            "Repository name '{name}' is reserved"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(CoreError::ValidationError(format!(
            "Repository name contains invalid character '{c}'"
        )));
    }
    Ok(())
}

/// Record name and content must be present and the TTL at least 1.
pub fn validate_record_fields(name: &str, content: &str, ttl: u32) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "Record name cannot be empty".to_string(),
        ));
    }
    if content.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "Record content cannot be empty".to_string(),
        ));
    }
    if ttl == 0 {
        return Err(CoreError::ValidationError(
            "TTL must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Non-empty after trimming.
pub fn require_non_empty(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        Err(CoreError::ValidationError(format!("{field} cannot be empty")))
    } else {
        Ok(())
    }
}
