use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub sqlx_logging: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_url() -> String {
    IN_MEMORY_URL.to_string()
}

fn default_max_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// An in-memory SQLite database lives inside a single connection.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl CatalogConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, expanding `${VAR}` placeholders
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    // Unset variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        let database = &self.database;

        validate_non_empty_string("database.url", &database.url)?;
        if !database.url.starts_with("sqlite:") {
            return Err(CatalogError::ConfigValidationError {
                field: "database.url".to_string(),
                message: format!("Unsupported database url: {}", database.url),
            });
        }

        validate_positive_number("database.max_connections", database.max_connections, 1)?;
        if database.is_in_memory() && database.max_connections != 1 {
            return Err(CatalogError::ConfigValidationError {
                field: "database.max_connections".to_string(),
                message: "An in-memory database requires exactly one connection".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[database]
url = "sqlite://catalog.db?mode=rwc"
max_connections = 4
sqlx_logging = true

[logging]
level = "hero_catalog=debug"
json = true
"#;

        let config = CatalogConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.database.url, "sqlite://catalog.db?mode=rwc");
        assert_eq!(config.database.max_connections, 4);
        assert!(config.database.sqlx_logging);
        assert!(!config.database.is_in_memory());
        assert_eq!(config.logging().level.as_deref(), Some("hero_catalog=debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::from_toml_str("").unwrap();
        assert_eq!(config.database.url, IN_MEMORY_URL);
        assert_eq!(config.database.max_connections, 1);
        assert!(config.database.is_in_memory());
        assert!(config.logging.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HERO_CATALOG_TEST_DB", "sqlite://heroes.db?mode=rwc");

        let toml_content = r#"
[database]
url = "${HERO_CATALOG_TEST_DB}"
"#;

        let config = CatalogConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.database.url, "sqlite://heroes.db?mode=rwc");

        std::env::remove_var("HERO_CATALOG_TEST_DB");
    }

    #[test]
    fn test_config_validation() {
        let unset = CatalogConfig::from_toml_str(
            r#"
[database]
url = "${HERO_CATALOG_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert!(unset.validate().is_err());

        let shared_memory = CatalogConfig::from_toml_str(
            r#"
[database]
url = "sqlite::memory:"
max_connections = 3
"#,
        )
        .unwrap();
        assert!(shared_memory.validate().is_err());

        let no_connections = CatalogConfig::from_toml_str(
            r#"
[database]
url = "sqlite://catalog.db"
max_connections = 0
"#,
        )
        .unwrap();
        assert!(no_connections.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[database]
url = "sqlite://file-test.db?mode=rwc"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = CatalogConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.database.url, "sqlite://file-test.db?mode=rwc");
    }

    #[test]
    fn test_malformed_toml() {
        let err = CatalogConfig::from_toml_str("[database\nurl = 1").unwrap_err();
        assert_eq!(err.error_code(), "ConfigValidationError");
    }
}
