// JWT token issuance and validation service

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::models::{IdentityClaims, TokenPair};
use crate::config::JwtConfig;

/// Claims carried by a refresh token: just enough to re-issue a pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Unique id so two refresh tokens never collide
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenUse {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize)]
struct AccessEnvelope {
    #[serde(flatten)]
    claims: IdentityClaims,
    token_use: TokenUse,
}

#[derive(Serialize, Deserialize)]
struct RefreshEnvelope {
    #[serde(flatten)]
    claims: RefreshClaims,
    token_use: TokenUse,
}

/// Token service for JWT operations (HS256 over a shared secret)
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("access_token_duration", &self.access_token_duration)
            .field("refresh_token_duration", &self.refresh_token_duration)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a TokenService. An empty secret is rejected; there is no
    /// fallback key.
    pub fn new(
        secret: &str,
        access_token_duration: i64,
        refresh_token_duration: i64,
    ) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_token_duration,
            refresh_token_duration,
        })
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, AuthError> {
        Self::new(
            config.secret(),
            hours_to_secs(config.access_token_ttl_hours)?,
            hours_to_secs(config.refresh_token_ttl_hours)?,
        )
    }

    /// Issue an access/refresh pair for the given identity.
    ///
    /// `iat`/`exp` on the access claims are stamped here.
    pub fn issue(&self, claims: &IdentityClaims) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();

        let mut access_claims = claims.clone();
        access_claims.iat = now;
        access_claims.exp = expiry(now, self.access_token_duration)?;

        let refresh_claims = RefreshClaims {
            sub: claims.sub.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: expiry(now, self.refresh_token_duration)?,
        };

        Ok(TokenPair {
            access_token: self.sign_access(access_claims)?,
            refresh_token: self.sign_refresh(refresh_claims)?,
        })
    }

    /// Validate an access token and return its identity claims
    pub fn validate(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let envelope: AccessEnvelope = self.decode_token(token)?;
        if envelope.token_use != TokenUse::Access {
            return Err(AuthError::Malformed);
        }
        Ok(envelope.claims)
    }

    /// Validate a refresh token
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let envelope: RefreshEnvelope = self.decode_token(token)?;
        if envelope.token_use != TokenUse::Refresh {
            return Err(AuthError::Malformed);
        }
        Ok(envelope.claims)
    }

    /// Sign access claims exactly as given
    pub(crate) fn sign_access(&self, claims: IdentityClaims) -> Result<String, AuthError> {
        self.sign(&AccessEnvelope {
            claims,
            token_use: TokenUse::Access,
        })
    }

    pub(crate) fn sign_refresh(&self, claims: RefreshClaims) -> Result<String, AuthError> {
        self.sign(&RefreshEnvelope {
            claims,
            token_use: TokenUse::Refresh,
        })
    }

    fn sign<T: Serialize>(&self, payload: &T) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), payload, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn decode_token<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, AuthError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })
    }
}

fn hours_to_secs(hours: i64) -> Result<i64, AuthError> {
    hours
        .checked_mul(3600)
        .filter(|secs| *secs > 0)
        .ok_or_else(|| AuthError::Signing(format!("token lifetime of {} hours is out of range", hours)))
}

fn expiry(now: i64, duration: i64) -> Result<i64, AuthError> {
    now.checked_add(duration)
        .filter(|exp| *exp > now)
        .ok_or_else(|| AuthError::Signing("token expiry is out of range".to_string()))
}

/// SHA-256 hex digest of a token, the form in which refresh tokens are stored
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::models::{Gender, Role};
    use proptest::prelude::*;

    pub(crate) const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";
    const WEEK: i64 = 168 * 3600;

    fn test_token_service() -> TokenService {
        TokenService::new(TEST_SECRET, WEEK, WEEK).unwrap()
    }

    pub(crate) fn sample_claims(sub: &str, role: Role) -> IdentityClaims {
        IdentityClaims {
            sub: sub.to_string(),
            username: "jdoe".to_string(),
            firstname: "Jane".to_string(),
            lastname: "Doe".to_string(),
            email: "jdoe@example.com".to_string(),
            phone: "+233241234567".to_string(),
            gender: Gender::Female,
            role,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            TokenService::new("", WEEK, WEEK),
            Err(AuthError::MissingSecret)
        ));
        assert!(matches!(
            TokenService::new("   ", WEEK, WEEK),
            Err(AuthError::MissingSecret)
        ));
    }

    #[test]
    fn test_issue_then_validate_returns_claims() {
        let service = test_token_service();
        let claims = sample_claims("42", Role::User);
        let pair = service.issue(&claims).unwrap();

        let validated = service.validate(&pair.access_token).unwrap();
        assert_eq!(validated.sub, "42");
        assert_eq!(validated.email, "jdoe@example.com");
        assert_eq!(validated.role, Role::User);
        assert_eq!(validated.exp - validated.iat, WEEK);
    }

    #[test]
    fn test_refresh_token_carries_subject() {
        let service = test_token_service();
        let pair = service.issue(&sample_claims("42", Role::User)).unwrap();

        let refresh = service.validate_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "42");
        assert_eq!(refresh.exp - refresh.iat, WEEK);
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = test_token_service();
        let pair = service.issue(&sample_claims("42", Role::User)).unwrap();

        assert!(matches!(
            service.validate(&pair.refresh_token),
            Err(AuthError::Malformed)
        ));
        assert!(matches!(
            service.validate_refresh(&pair.access_token),
            Err(AuthError::Malformed)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_token_service();
        let now = Utc::now().timestamp();
        let mut claims = sample_claims("42", Role::User);
        claims.iat = now - 1000;
        claims.exp = now - 1;

        let token = service.sign_access(claims).unwrap();
        assert!(matches!(service.validate(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let overflowing = TokenService::new(TEST_SECRET, i64::MAX, WEEK).unwrap();
        assert!(matches!(
            overflowing.issue(&sample_claims("42", Role::User)),
            Err(AuthError::Signing(_))
        ));

        let negative = TokenService::new(TEST_SECRET, -3600, WEEK).unwrap();
        assert!(matches!(
            negative.issue(&sample_claims("42", Role::User)),
            Err(AuthError::Signing(_))
        ));

        assert!(matches!(hours_to_secs(i64::MAX / 1000), Err(AuthError::Signing(_))));
        assert_eq!(hours_to_secs(168).unwrap(), WEEK);
    }

    #[test]
    fn test_other_secret_is_invalid_signature() {
        let issuer = TokenService::new("secret-alpha", WEEK, WEEK).unwrap();
        let validator = TokenService::new("secret-bravo", WEEK, WEEK).unwrap();
        let pair = issuer.issue(&sample_claims("42", Role::User)).unwrap();

        assert!(issuer.validate(&pair.access_token).is_ok());
        assert!(matches!(
            validator.validate(&pair.access_token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let service = test_token_service();
        let pair = service.issue(&sample_claims("42", Role::User)).unwrap();
        let forged = service.issue(&sample_claims("42", Role::Admin)).unwrap();

        // Splice the ADMIN payload onto the USER signature
        let original: Vec<&str> = pair.access_token.split('.').collect();
        let elevated: Vec<&str> = forged.access_token.split('.').collect();
        let spliced = format!("{}.{}.{}", original[0], elevated[1], original[2]);

        assert!(matches!(
            service.validate(&spliced),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        for token in ["", "not.a.token", "invalid_token_format"] {
            assert!(matches!(service.validate(token), Err(AuthError::Malformed)), "{token}");
        }
    }

    #[test]
    fn test_fingerprint_is_stable_sha256() {
        let digest = fingerprint("refresh-token");
        assert_eq!(digest, fingerprint("refresh-token"));
        assert_ne!(digest, fingerprint("other-token"));
        assert_eq!(digest.len(), 64);
    }

    proptest! {
        #[test]
        fn prop_subject_survives_round_trip(sub in "[a-f0-9]{24}") {
            let service = test_token_service();
            let pair = service.issue(&sample_claims(&sub, Role::User))?;
            let claims = service.validate(&pair.access_token)?;
            prop_assert_eq!(claims.sub, sub);
        }

        #[test]
        fn prop_random_strings_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.validate(&malformed).is_err());
        }
    }
}
