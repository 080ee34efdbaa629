use argon2::{
    password_hash::{self, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, PasswordHash, Version,
};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// Opaque one-way password encoding used by the user service.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> Result<String, ServiceError>;
    fn matches(&self, raw: &str, encoded: &str) -> Result<bool, ServiceError>;
}

/// Argon2id with a fresh random salt per call; output is a PHC string.
#[derive(Clone, Default)]
pub struct Argon2PasswordEncoder {
    argon: Argon2<'static>,
}

impl Argon2PasswordEncoder {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, ServiceError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| ServiceError::Hash(e.to_string()))?;
        Ok(Self { argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
    }

    pub fn from_config(cfg: &configs::PasswordConfig) -> Result<Self, ServiceError> {
        Self::new(cfg.memory_kib, cfg.iterations, cfg.parallelism)
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn matches(&self, raw: &str, encoded: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(encoded).map_err(|e| ServiceError::Hash(e.to_string()))?;
        match self.argon.verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ServiceError::Hash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordEncoder {
        Argon2PasswordEncoder::new(8, 1, 1).unwrap()
    }

    #[test]
    fn encode_then_match() {
        let enc = cheap();
        let hash = enc.encode("S3curePass!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("S3curePass!"));
        assert!(enc.matches("S3curePass!", &hash).unwrap());
        assert!(!enc.matches("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ_per_call() {
        let enc = cheap();
        assert_ne!(enc.encode("same").unwrap(), enc.encode("same").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(cheap().matches("x", "not-a-phc-string"), Err(ServiceError::Hash(_))));
    }

    #[test]
    fn rejects_impossible_params() {
        assert!(Argon2PasswordEncoder::new(1, 1, 1).is_err());
    }
}
