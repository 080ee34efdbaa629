use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{field} already exists: {value}")]
    DuplicateEntry { field: &'static str, value: String },
    #[error("user not found: {0}")]
    NotFound(i64),
    #[error("password hashing error: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn duplicate(field: &'static str, value: impl Into<String>) -> Self {
        Self::DuplicateEntry { field, value: value.into() }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::DuplicateEntry { .. } => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Hash(_) => 1101,
            ServiceError::Db(_) => 1200,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => Self::Validation(msg),
            models::errors::ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
