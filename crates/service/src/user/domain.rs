use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Create/update request body. Every field is required; update overwrites all of them.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl fmt::Debug for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInput")
            .field("email", &self.email)
            .field("password", &"***")
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

impl UserInput {
    /// Boundary validation. Reports every violated field at once.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let problems: Vec<String> = [
            models::user::validate_email(&self.email),
            models::user::validate_password(&self.password),
            models::user::validate_name(&self.name),
            models::user::validate_phone(&self.phone_number),
        ]
        .into_iter()
        .filter_map(|r| r.err())
        .map(|e| match e {
            models::errors::ModelError::Validation(msg) | models::errors::ModelError::Db(msg) => msg,
        })
        .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(problems.join("; ")))
        }
    }
}

/// Persisted user as seen by the service (carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for insert and full-overwrite update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone_number: String,
}

/// Outward representation; has no password field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone_number: u.phone_number,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
