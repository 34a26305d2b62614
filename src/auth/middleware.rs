// Authentication extractors for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    guard,
    models::{IdentityClaims, Role},
    token::TokenService,
};
use crate::error::ApiError;

/// Caller identity, taken only from a validated `Authorization: Bearer`
/// access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: IdentityClaims,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Malformed)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let endpoint = parts.uri.path().to_string();

        let token = bearer_token(parts).map_err(|e| {
            warn!("Rejected credentials for {}: {}", endpoint, e);
            e
        })?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.validate(token)?;

        debug!(
            "Authenticated user_id={}, role={}, endpoint={}",
            claims.sub, claims.role, endpoint
        );
        Ok(AuthenticatedUser { claims })
    }
}

/// Extractor that additionally requires the ADMIN role (403 otherwise)
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        guard::require_role(&user.claims, Role::Admin)?;
        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::{sample_claims, TEST_SECRET};
    use axum::http::Request;
    use chrono::Utc;

    #[derive(Clone)]
    struct TestState {
        tokens: Arc<TokenService>,
    }

    impl FromRef<TestState> for Arc<TokenService> {
        fn from_ref(state: &TestState) -> Self {
            state.tokens.clone()
        }
    }

    fn test_state() -> TestState {
        TestState {
            tokens: Arc::new(TokenService::new(TEST_SECRET, 3600, 3600).unwrap()),
        }
    }

    fn parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/api/users/42")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();
        req.into_parts().0
    }

    fn parts_without_auth() -> Parts {
        let req = Request::builder().uri("/api/users/42").body(()).unwrap();
        req.into_parts().0
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        let state = test_state();
        let pair = state.tokens.issue(&sample_claims("42", Role::User)).unwrap();

        let mut parts = parts_with_auth(&format!("Bearer {}", pair.access_token));
        let user = AuthenticatedUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

        assert_eq!(user.user_id(), "42");
        assert_eq!(user.role(), Role::User);
    }

    #[tokio::test]
    async fn test_missing_header() {
        let state = test_state();
        let mut parts = parts_without_auth();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &state).await;

        assert!(matches!(result, Err(ApiError::Auth(AuthError::MissingToken))));
    }

    #[tokio::test]
    async fn test_non_bearer_schemes_are_rejected() {
        let state = test_state();
        for value in ["token_without_bearer", "Basic dXNlcjpwYXNz", "Bearer ", "Bearer"] {
            let mut parts = parts_with_auth(value);
            let result = AuthenticatedUser::from_request_parts(&mut parts, &state).await;
            assert!(
                matches!(result, Err(ApiError::Auth(AuthError::Malformed))),
                "{value}"
            );
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let state = test_state();
        let now = Utc::now().timestamp();
        let mut claims = sample_claims("42", Role::User);
        claims.iat = now - 1000;
        claims.exp = now - 500;
        let token = state.tokens.sign_access(claims).unwrap();

        let mut parts = parts_with_auth(&format!("Bearer {}", token));
        let result = AuthenticatedUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(ApiError::Auth(AuthError::Expired))));
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let state = test_state();
        let pair = state.tokens.issue(&sample_claims("42", Role::User)).unwrap();

        let mut parts = parts_with_auth(&format!("Bearer {}", pair.refresh_token));
        let result = AuthenticatedUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(ApiError::Auth(AuthError::Malformed))));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let state = test_state();

        let admin = state.tokens.issue(&sample_claims("1", Role::Admin)).unwrap();
        let mut parts = parts_with_auth(&format!("Bearer {}", admin.access_token));
        assert!(RequireAdmin::from_request_parts(&mut parts, &state).await.is_ok());

        let user = state.tokens.issue(&sample_claims("42", Role::User)).unwrap();
        let mut parts = parts_with_auth(&format!("Bearer {}", user.access_token));
        let result = RequireAdmin::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(ApiError::Auth(AuthError::Forbidden(_)))));
    }
}
