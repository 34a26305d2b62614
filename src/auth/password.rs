// Password hashing and verification service

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::auth::error::AuthError;

/// Password service for hashing and verification.
///
/// Hashes are Argon2id PHC strings with a random salt, so the parameters
/// and salt travel with the hash and verification needs nothing else.
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
}

impl Default for PasswordService {
    /// Argon2id with the library's recommended cost (19 MiB, 2 passes)
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordService {
    /// Create a service with explicit Argon2 cost parameters
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Verify a password against a hash.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::MalformedHash)?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hash(e.to_string())),
        }
    }

    /// Hash on the blocking pool so the executor is not stalled
    pub async fn hash_async(&self, password: String) -> Result<String, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
    }

    /// Verify on the blocking pool
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
    }
}

#[cfg(test)]
pub(crate) fn fast_password_service() -> PasswordService {
    // Minimum cost keeps the test suite quick
    PasswordService::with_params(Params::new(8, 1, 1, None).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify() {
        let service = fast_password_service();
        let hash = service.hash("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "secret123");
        assert!(service.verify("secret123", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let service = fast_password_service();
        let hash = service.hash("secret123").unwrap();

        assert!(!service.verify("wrongpass", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let service = fast_password_service();
        let first = service.hash("secret123").unwrap();
        let second = service.hash("secret123").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("secret123", &first).unwrap());
        assert!(service.verify("secret123", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let service = fast_password_service();
        let result = service.verify("secret123", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::MalformedHash)));
    }

    #[test]
    fn test_hash_from_other_cost_still_verifies() {
        let hash = fast_password_service().hash("secret123").unwrap();
        // Parameters are read from the PHC string, not from the verifier
        assert!(PasswordService::default().verify("secret123", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let service = fast_password_service();
        let hash = service.hash_async("secret123".to_string()).await.unwrap();
        assert!(service
            .verify_async("secret123".to_string(), hash)
            .await
            .unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_hash_verifies_own_password(password in "[ -~]{1,40}") {
            let service = fast_password_service();
            let hash = service.hash(&password)?;
            prop_assert!(service.verify(&password, &hash)?);
        }

        #[test]
        fn prop_hash_rejects_other_password(
            first in "[a-z0-9]{8,20}",
            second in "[a-z0-9]{8,20}"
        ) {
            prop_assume!(first != second);
            let service = fast_password_service();
            let hash = service.hash(&second)?;
            prop_assert!(!service.verify(&first, &hash)?);
        }
    }
}
