// Authentication service - business logic layer

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        AuthResponse, ChangePasswordRequest, IdentityClaims, LoginRequest, Role, SignupRequest,
        User, UserResponse,
    },
    password::PasswordService,
    repository::UserStore,
    token::{fingerprint, TokenService},
};
use crate::error::ApiError;

/// Authentication service coordinating hashing, token issuance and the
/// user store
pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
    /// Hash verified against when the email is unknown, so both login
    /// failures cost the same Argon2 work
    decoy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: PasswordService,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Register a new USER account and log it in
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, ApiError> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(ApiError::Conflict {
                message: "Email already exists".to_string(),
            });
        }

        let password_hash = self.passwords.hash_async(request.password).await?;
        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            firstname: request.firstname,
            lastname: request.lastname,
            email: request.email,
            password_hash,
            phone: request.phone,
            gender: request.gender,
            date_of_birth: request.date_of_birth,
            role: Role::User,
            refresh_token_hash: None,
            last_login: Some(now),
            created_at: now,
            updated_at: now,
        };

        let pair = self.tokens.issue(&IdentityClaims::from(&user))?;
        user.refresh_token_hash = Some(fingerprint(&pair.refresh_token));

        let user = self.users.insert(user).await?;
        info!("Registered user {}", user.id);

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: UserResponse::from(user),
        })
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller,
    /// in body and in the hashing work done.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        request.validate()?;

        let Some(mut user) = self.users.find_by_email(&request.email).await? else {
            let decoy = self.decoy_hash().await?.to_string();
            self.passwords.verify_async(request.password, decoy).await?;
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let matches = self
            .passwords
            .verify_async(request.password, user.password_hash.clone())
            .await?;
        if !matches {
            warn!("Login failed for user {}: wrong password", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.tokens.issue(&IdentityClaims::from(&user))?;
        let refresh_hash = fingerprint(&pair.refresh_token);
        let now = Utc::now();
        if !self.users.record_login(&user.id, &refresh_hash, now).await? {
            return Err(not_found(&user.id));
        }
        user.refresh_token_hash = Some(refresh_hash);
        user.last_login = Some(now);
        user.updated_at = now;

        info!("User {} logged in", user.id);
        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: UserResponse::from(user),
        })
    }

    /// Exchange the current refresh token for a new pair; the old refresh
    /// token stops working. Of two concurrent exchanges of one token, only
    /// one succeeds.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ApiError> {
        let claims = self.tokens.validate_refresh(refresh_token)?;

        let mut user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::RevokedToken)?;

        // Claims are rebuilt from the record so profile and role changes
        // are picked up
        let pair = self.tokens.issue(&IdentityClaims::from(&user))?;
        let replacement = fingerprint(&pair.refresh_token);
        let now = Utc::now();

        let rotated = self
            .users
            .rotate_refresh(&user.id, &fingerprint(refresh_token), &replacement, now)
            .await?;
        if !rotated {
            warn!("Refresh with a revoked token for user {}", user.id);
            return Err(AuthError::RevokedToken.into());
        }
        user.refresh_token_hash = Some(replacement);
        user.updated_at = now;

        debug!("Rotated tokens for user {}", user.id);
        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: UserResponse::from(user),
        })
    }

    /// Forget the stored refresh token. Access tokens already issued stay
    /// valid until they expire.
    pub async fn logout(&self, user_id: &str) -> Result<(), ApiError> {
        if !self.users.clear_refresh(user_id, Utc::now()).await? {
            return Err(not_found(user_id));
        }

        info!("User {} logged out", user_id);
        Ok(())
    }

    /// Replace a password after checking the current one. Also revokes the
    /// stored refresh token.
    pub async fn change_password(
        &self,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        request.validate()?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found(user_id))?;
        let matches = self
            .passwords
            .verify_async(request.old_password, user.password_hash.clone())
            .await?;
        if !matches {
            warn!("Password change for user {} with wrong current password", user_id);
            return Err(AuthError::InvalidCredentials.into());
        }

        let new_hash = self.passwords.hash_async(request.new_password).await?;
        let replaced = self
            .users
            .set_password(user_id, &user.password_hash, &new_hash, Utc::now())
            .await?;
        if !replaced {
            // The password changed since it was verified
            warn!("Password change for user {} lost to a concurrent change", user_id);
            return Err(AuthError::InvalidCredentials.into());
        }

        info!("Password updated for user {}", user_id);
        Ok(())
    }

    async fn decoy_hash(&self) -> Result<&str, AuthError> {
        self.decoy_hash
            .get_or_try_init(|| self.passwords.hash_async(Uuid::new_v4().to_string()))
            .await
            .map(String::as_str)
    }
}

fn not_found(user_id: &str) -> ApiError {
    ApiError::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    }
}
