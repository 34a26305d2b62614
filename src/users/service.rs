use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    models::UserResponse,
    repository::{ProfileChanges, UserStore},
};
use crate::error::ApiError;
use crate::query::{Page, PageWindow};
use crate::users::models::UpdateUserRequest;

/// Profile reads and updates on top of the user store
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: &str) -> Result<UserResponse, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found(user_id))
    }

    /// Apply a partial profile update. Only the profile columns are
    /// written; email changes are checked for uniqueness by the store.
    pub async fn update(
        &self,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        request.validate()?;

        if request.is_empty() {
            return self.get(user_id).await;
        }

        let changes = ProfileChanges::from(request);
        let user = self
            .users
            .update_profile(user_id, &changes, Utc::now())
            .await?
            .ok_or_else(|| not_found(user_id))?;

        tracing::info!("Updated profile for user {}", user_id);
        Ok(UserResponse::from(user))
    }

    pub async fn list(&self, window: PageWindow) -> Result<Page<UserResponse>, ApiError> {
        let (users, total) = self.users.list(window.offset, window.limit).await?;
        tracing::debug!("Listed {} of {} users", users.len(), total);
        Ok(Page::new(window, total, users).map(UserResponse::from))
    }
}

fn not_found(user_id: &str) -> ApiError {
    ApiError::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::tests::sample_user;
    use crate::auth::repository::MemoryUserStore;
    use crate::query::PageParams;

    async fn seeded() -> UserService {
        let store = Arc::new(MemoryUserStore::new());
        store.insert(sample_user("1", "ama@example.com")).await.unwrap();
        store.insert(sample_user("2", "kofi@example.com")).await.unwrap();
        UserService::new(store)
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let service = seeded().await;
        assert!(matches!(
            service.get("99").await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let service = seeded().await;
        let updated = service
            .update(
                "1",
                UpdateUserRequest {
                    lastname: Some("Owusu".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.lastname, "Owusu");
        assert_eq!(updated.firstname, "Ama");
        assert_eq!(updated.email, "ama@example.com");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let service = seeded().await;
        let result = service
            .update(
                "1",
                UpdateUserRequest {
                    email: Some("KOFI@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let service = seeded().await;
        let page = service
            .list(
                PageParams {
                    page: Some(1),
                    records_per_page: Some(1),
                }
                .window(),
            )
            .await
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.data.len(), 1);
    }
}
