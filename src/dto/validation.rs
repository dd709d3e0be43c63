//! Validation helpers for DTOs.

use std::collections::HashSet;

use validator::ValidationError;

/// Minimum game name length, counted in characters after trimming.
pub const NAME_MIN: usize = 3;
/// Maximum game name length, counted in characters after trimming.
pub const NAME_MAX: usize = 20;

/// Validates that a game name holds 3 to 20 characters once trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_game_name("Friday night") // Ok
/// validate_game_name("  ab ")        // Err - too short once trimmed
/// ```
pub fn validate_game_name(name: &str) -> Result<(), ValidationError> {
    let length = name.trim().chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&length) {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be between {NAME_MIN} and {NAME_MAX} characters (got {length})")
                .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Validates that category names are non-blank and distinct.
pub fn validate_category_names(names: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            let mut err = ValidationError::new("category_blank");
            err.message = Some("Category names cannot be blank".into());
            return Err(err);
        }
        if !seen.insert(trimmed.to_lowercase()) {
            let mut err = ValidationError::new("category_duplicate");
            err.message = Some(format!("Category `{trimmed}` is listed twice").into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_game_name() {
        assert!(validate_game_name("Quiz").is_ok());
        assert!(validate_game_name("مسابقة الجمعة").is_ok());
        assert!(validate_game_name("ab").is_err());
        assert!(validate_game_name("   ab   ").is_err());
        assert!(validate_game_name("a very long game name here").is_err());
    }

    #[test]
    fn test_validate_category_names() {
        assert!(validate_category_names(&["Prophets".into(), "Places".into()]).is_ok());
        assert!(validate_category_names(&["Prophets".into(), " ".into()]).is_err());
        assert!(validate_category_names(&["Prophets".into(), "prophets ".into()]).is_err());
    }
}
