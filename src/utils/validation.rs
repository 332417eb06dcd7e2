use crate::entities::hero_power::Strength;
use crate::utils::error::{CatalogError, Result};

pub const MIN_DESCRIPTION_LENGTH: usize = 20;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Guard for `Power.description`: present and at least 20 characters.
///
/// Length is counted in characters, not bytes. The value is returned untouched.
pub fn validate_description(value: Option<&str>) -> Result<&str> {
    match value {
        Some(description)
            if !description.is_empty()
                && description.chars().count() >= MIN_DESCRIPTION_LENGTH =>
        {
            Ok(description)
        }
        _ => Err(CatalogError::validation(
            "description",
            "Description must be present and at least 20 characters long",
        )),
    }
}

/// Guard for `HeroPower.strength`: one of `Strong`, `Weak`, `Average`, exact case.
pub fn validate_strength(value: &str) -> Result<Strength> {
    Strength::ALL
        .into_iter()
        .find(|strength| strength.as_str() == value)
        .ok_or_else(|| CatalogError::validation("strength", "Invalid strength value."))
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(CatalogError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Value must be at least {}, got {}", min_value, value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_description() {
        let description = "Allows the wielder to fly at great speed";
        assert_eq!(validate_description(Some(description)).unwrap(), description);
        assert_eq!(
            validate_description(Some("exactly twenty chars")).unwrap(),
            "exactly twenty chars"
        );

        assert!(validate_description(Some("nineteen characters")).is_err());
        assert!(validate_description(Some("short")).is_err());
        assert!(validate_description(Some("")).is_err());
        assert!(validate_description(None).is_err());
    }

    #[test]
    fn test_validate_description_counts_characters() {
        // 20 characters, 40 bytes
        let cyrillic = "ж".repeat(20);
        assert!(validate_description(Some(&cyrillic)).is_ok());

        // 10 characters, 20 bytes
        let short = "ж".repeat(10);
        assert!(validate_description(Some(&short)).is_err());
    }

    #[test]
    fn test_validate_description_error_message() {
        match validate_description(Some("short")) {
            Err(CatalogError::ValidationError { field, message }) => {
                assert_eq!(field, "description");
                assert_eq!(
                    message,
                    "Description must be present and at least 20 characters long"
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_strength() {
        assert_eq!(validate_strength("Strong").unwrap(), Strength::Strong);
        assert_eq!(validate_strength("Weak").unwrap(), Strength::Weak);
        assert_eq!(validate_strength("Average").unwrap(), Strength::Average);

        for rejected in ["Mighty", "strong", "STRONG", "", " Weak"] {
            match validate_strength(rejected) {
                Err(CatalogError::ValidationError { field, message }) => {
                    assert_eq!(field, "strength");
                    assert_eq!(message, "Invalid strength value.");
                }
                other => panic!("{:?} accepted: {:?}", rejected, other),
            }
        }
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("database.max_connections", 5, 1).is_ok());
        assert!(validate_positive_number("database.max_connections", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("database.url", "sqlite::memory:").is_ok());
        assert!(validate_non_empty_string("database.url", "   ").is_err());
    }
}
