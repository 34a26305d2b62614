use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::models::Gender;
use crate::auth::repository::ProfileChanges;
use crate::validation::{validate_birth_date, validate_phone};

/// Profile update request. Omitted fields keep their current value;
/// role and password are not changeable here.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(length(max = 64))]
    pub firstname: Option<String>,
    #[validate(length(max = 64))]
    pub lastname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    #[validate(custom = "validate_birth_date")]
    pub date_of_birth: Option<NaiveDate>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.firstname.is_none()
            && self.lastname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.gender.is_none()
            && self.date_of_birth.is_none()
    }
}

impl From<UpdateUserRequest> for ProfileChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            firstname: request.firstname,
            lastname: request.lastname,
            email: request.email,
            phone: request.phone,
            gender: request.gender,
            date_of_birth: request.date_of_birth,
        }
    }
}
