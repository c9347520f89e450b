pub mod container_service;
pub mod context;
pub mod doll_service;
pub mod event_service;
pub mod photo_service;

pub use context::ServiceContext;

use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 255;

/// Trimmed, non-empty name of at most `MAX_NAME_LEN` characters.
pub(crate) fn normalize_name(raw: &str, what: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request(format!("{what} name must not be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::bad_request(format!(
            "{what} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(normalize_name("  Alice ", "Doll").expect("valid"), "Alice");
        assert!(normalize_name("   ", "Doll").is_err());
        assert!(normalize_name(&"x".repeat(256), "Doll").is_err());
        assert!(normalize_name(&"é".repeat(255), "Doll").is_ok());
    }
}
