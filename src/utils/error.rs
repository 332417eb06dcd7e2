use crate::domain::model::EntityKind;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Integrity error: {message}")]
    IntegrityError { message: String },

    #[error("{kind} {id} not found")]
    NotFoundError { kind: EntityKind, id: i32 },

    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error on {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

impl CatalogError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityError {
            message: message.into(),
        }
    }

    /// NOT NULL violation for a required column, reported before the write.
    pub fn missing_column(table: &str, column: &str) -> Self {
        Self::integrity(format!("NOT NULL constraint failed: {}.{}", table, column))
    }

    pub fn not_found(kind: EntityKind, id: i32) -> Self {
        Self::NotFoundError { kind, id }
    }

    /// Machine-readable error name for the API layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "ValidationError",
            Self::IntegrityError { .. } => "IntegrityError",
            Self::NotFoundError { .. } => "NotFoundError",
            Self::DatabaseError(_) => "DatabaseError",
            Self::SerializationError(_) => "SerializationError",
            Self::IoError(_) => "IoError",
            Self::ConfigValidationError { .. } => "ConfigValidationError",
        }
    }
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(message))
            | Some(SqlErr::UniqueConstraintViolation(message)) => Self::IntegrityError { message },
            _ => Self::DatabaseError(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CatalogError::validation("strength", "Invalid strength value.").error_code(),
            "ValidationError"
        );
        assert_eq!(
            CatalogError::not_found(EntityKind::Hero, 7).error_code(),
            "NotFoundError"
        );
        assert_eq!(
            CatalogError::missing_column("powers", "name").to_string(),
            "Integrity error: NOT NULL constraint failed: powers.name"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found(EntityKind::HeroPower, 3);
        assert_eq!(err.to_string(), "HeroPower 3 not found");
    }

    #[test]
    fn test_plain_db_error_stays_database_error() {
        let err: CatalogError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, CatalogError::DatabaseError(_)));
    }
}
