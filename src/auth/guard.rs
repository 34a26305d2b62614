//! Access guard: authorization decisions over validated token claims.
//!
//! Both checks are pure and independent. Self-service endpoints use
//! [`match_owner_or_role`]; admin-only endpoints use [`require_role`].

use tracing::warn;

use crate::auth::error::AuthError;
use crate::auth::models::{IdentityClaims, Role};

/// Allow when the caller holds an elevated role or owns the resource.
pub fn match_owner_or_role(claims: &IdentityClaims, owner_id: &str) -> Result<(), AuthError> {
    if claims.role != Role::User || claims.sub == owner_id {
        return Ok(());
    }

    warn!(
        "Ownership check failed: subject={}, role={}, owner={}",
        claims.sub, claims.role, owner_id
    );
    Err(AuthError::Forbidden(
        "unauthorised to access this resource".to_string(),
    ))
}

/// Allow only when the caller's role equals `required`.
pub fn require_role(claims: &IdentityClaims, required: Role) -> Result<(), AuthError> {
    if claims.role == required {
        return Ok(());
    }

    warn!(
        "Role check failed: subject={}, required_role={}, actual_role={}",
        claims.sub, required, claims.role
    );
    Err(AuthError::Forbidden(format!("{} role required", required)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::sample_claims;

    #[test]
    fn test_user_may_access_own_resource() {
        let claims = sample_claims("42", Role::User);
        assert!(match_owner_or_role(&claims, "42").is_ok());
    }

    #[test]
    fn test_user_may_not_access_other_resource() {
        let claims = sample_claims("42", Role::User);
        assert!(matches!(
            match_owner_or_role(&claims, "7"),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        let claims = sample_claims("42", Role::Admin);
        assert!(match_owner_or_role(&claims, "7").is_ok());
        assert!(match_owner_or_role(&claims, "42").is_ok());
    }

    #[test]
    fn test_require_role_is_strict() {
        let user = sample_claims("42", Role::User);
        let admin = sample_claims("1", Role::Admin);

        assert!(matches!(
            require_role(&user, Role::Admin),
            Err(AuthError::Forbidden(_))
        ));
        assert!(require_role(&admin, Role::Admin).is_ok());
        assert!(require_role(&user, Role::User).is_ok());
        // A strict match: admin does not satisfy a USER requirement
        assert!(require_role(&admin, Role::User).is_err());
    }
}
