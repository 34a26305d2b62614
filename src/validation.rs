// Validation utilities module
// Custom field rules shared by the request DTOs

use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

use crate::auth::models::ChangePasswordRequest;

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]{8,20}$").expect("phone pattern is valid"))
}

/// Validates a phone number: optional leading '+', then 8 to 20 digits,
/// spaces, dashes or parentheses
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone_pattern().is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}

/// Validates that a birth date is not in the future
pub fn validate_birth_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        Err(ValidationError::new("birth_date_in_future"))
    } else {
        Ok(())
    }
}

/// New password must differ from the current one
pub fn validate_password_change(request: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if request.old_password == request.new_password {
        Err(ValidationError::new("new_password_must_differ"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_phone_formats() {
        assert!(validate_phone("+233 24 123 4567").is_ok());
        assert!(validate_phone("(555) 123-4567").is_ok());
        assert!(validate_phone("12345678").is_ok());
        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("call me maybe").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_birth_date_not_in_future() {
        let today = Utc::now().date_naive();
        assert!(validate_birth_date(&today).is_ok());
        assert!(validate_birth_date(&(today - Duration::days(365 * 30))).is_ok());
        assert!(validate_birth_date(&(today + Duration::days(2))).is_err());
    }
}
