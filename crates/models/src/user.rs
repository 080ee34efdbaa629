//! `user` entity and the field rules shared by every layer that accepts user data.
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::entity::prelude::*;

use crate::errors::ModelError;

pub const EMAIL_MAX_LEN: usize = 255;
pub const NAME_MAX_LEN: usize = 100;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$").expect("valid email regex")
});

// 02-123-4567, 010-1234-5678
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,3}-\d{3,4}-\d{4}$").expect("valid phone regex"));

/// The stored row. Deliberately not `Serialize`: the password column must
/// never reach a response body.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub name: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() {
        return Err(ModelError::Validation("email is required".into()));
    }
    if email.len() > EMAIL_MAX_LEN || !EMAIL_RE.is_match(email) {
        return Err(ModelError::Validation("email must be a valid address".into()));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    if phone.trim().is_empty() {
        return Err(ModelError::Validation("phone number is required".into()));
    }
    if !PHONE_RE.is_match(phone) {
        return Err(ModelError::Validation(
            "phone number format is invalid (e.g. 010-1234-5678)".into(),
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name is required".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ModelError::Validation(format!("name must be at most {NAME_MAX_LEN} characters")));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.trim().is_empty() {
        return Err(ModelError::Validation("password is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("kim@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.kr").is_ok());
        assert!(validate_email("root@localhost").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("space in@example.com").is_err());
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone("010-1234-5678").is_ok());
        assert!(validate_phone("02-123-4567").is_ok());
        assert!(validate_phone("031-1234-5678").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("01012345678").is_err());
        assert!(validate_phone("0101-1234-5678").is_err());
        assert!(validate_phone("010-12-5678").is_err());
        assert!(validate_phone("010-1234-567").is_err());
        assert!(validate_phone("010-1234-5678 ").is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("홍길동").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"가".repeat(NAME_MAX_LEN)).is_ok());
        assert!(validate_name(&"가".repeat(NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password(" ").is_err());
    }
}
