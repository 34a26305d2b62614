// User record stores

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::auth::models::{Gender, User};
use crate::db::{map_unique_violation, StoreError};

/// Profile columns to overwrite; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileChanges {
    fn apply(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(firstname) = &self.firstname {
            user.firstname = firstname.clone();
        }
        if let Some(lastname) = &self.lastname {
            user.lastname = lastname.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = phone.clone();
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if self.date_of_birth.is_some() {
            user.date_of_birth = self.date_of_birth;
        }
    }
}

/// Persistence for user records. Emails are unique, compared
/// case-insensitively.
///
/// Every write touches only the columns it owns, as one atomic statement,
/// so concurrent writers never overwrite each other's fields.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; `EmailTaken` if the email is in use
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Apply profile changes and return the updated record; `None` when
    /// no such user exists
    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Store the refresh fingerprint of a fresh login and stamp `last_login`
    async fn record_login(
        &self,
        id: &str,
        refresh_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Replace the refresh fingerprint only if it still equals `expected`
    async fn rotate_refresh(
        &self,
        id: &str,
        expected: &str,
        replacement: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Forget the stored refresh fingerprint
    async fn clear_refresh(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Replace the password hash only if it still equals `expected`, and
    /// revoke the stored refresh fingerprint
    async fn set_password(
        &self,
        id: &str,
        expected: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// One window of users ordered by creation time, plus the total count
    async fn list(&self, offset: u64, limit: u32) -> Result<(Vec<User>, u64), StoreError>;
}

const USER_COLUMNS: &str = "id, username, firstname, lastname, email, password_hash, phone, \
     gender, date_of_birth, role, refresh_token_hash, last_login, created_at, updated_at";

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.phone)
            .bind(user.gender)
            .bind(user.date_of_birth)
            .bind(user.role)
            .bind(&user.refresh_token_hash)
            .bind(user.last_login)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "UPDATE users \
             SET username = COALESCE($2, username), \
                 firstname = COALESCE($3, firstname), \
                 lastname = COALESCE($4, lastname), \
                 email = COALESCE($5, email), \
                 phone = COALESCE($6, phone), \
                 gender = COALESCE($7, gender), \
                 date_of_birth = COALESCE($8, date_of_birth), \
                 updated_at = $9 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.firstname)
            .bind(&changes.lastname)
            .bind(&changes.email)
            .bind(&changes.phone)
            .bind(changes.gender)
            .bind(changes.date_of_birth)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    async fn record_login(
        &self,
        id: &str,
        refresh_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $2, last_login = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(refresh_hash)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate_refresh(
        &self,
        id: &str,
        expected: &str,
        replacement: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $3, updated_at = $4
            WHERE id = $1 AND refresh_token_hash = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(replacement)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_refresh(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password(
        &self,
        id: &str,
        expected: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $3, refresh_token_hash = NULL, updated_at = $4
            WHERE id = $1 AND password_hash = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(password_hash)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, offset: u64, limit: u32) -> Result<(Vec<User>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(i64::from(limit))
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total.max(0) as u64))
    }
}

/// In-process user store, used when no database is configured and in tests.
/// Each write holds the map's write lock for its whole check-and-set.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_in_use(users: &HashMap<String, User>, email: &str, except_id: &str) -> bool {
    users
        .values()
        .any(|u| u.id != except_id && u.email.eq_ignore_ascii_case(email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if email_in_use(&users, &user.email, &user.id) {
            return Err(StoreError::EmailTaken);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if email_in_use(&users, email, id) {
                return Err(StoreError::EmailTaken);
            }
        }

        Ok(users.get_mut(id).map(|user| {
            changes.apply(user);
            user.updated_at = at;
            user.clone()
        }))
    }

    async fn record_login(
        &self,
        id: &str,
        refresh_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(id)
            .map(|user| {
                user.refresh_token_hash = Some(refresh_hash.to_string());
                user.last_login = Some(at);
                user.updated_at = at;
            })
            .is_some())
    }

    async fn rotate_refresh(
        &self,
        id: &str,
        expected: &str,
        replacement: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) if user.refresh_token_hash.as_deref() == Some(expected) => {
                user.refresh_token_hash = Some(replacement.to_string());
                user.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_refresh(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(id)
            .map(|user| {
                user.refresh_token_hash = None;
                user.updated_at = at;
            })
            .is_some())
    }

    async fn set_password(
        &self,
        id: &str,
        expected: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) if user.password_hash == expected => {
                user.password_hash = password_hash.to_string();
                user.refresh_token_hash = None;
                user.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, offset: u64, limit: u32) -> Result<(Vec<User>, u64), StoreError> {
        let users = self.users.read().await;
        let mut all: Vec<&User> = users.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, users.len() as u64))
    }
}
