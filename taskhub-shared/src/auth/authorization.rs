/// Authorization predicate
///
/// There is one privilege distinction in the system: administrators
/// (superusers) versus everyone else. It is expressed once here and handed
/// to the persistence layer as a [`TaskScope`], instead of every task
/// operation growing an "as admin" twin.
///
/// # Example
///
/// ```no_run
/// # use taskhub_shared::auth::authorization::{require_admin, task_scope};
/// # use taskhub_shared::auth::middleware::Principal;
/// # fn example(principal: Principal) -> Result<(), Box<dyn std::error::Error>> {
/// let scope = task_scope(&principal);
/// require_admin(&principal)?;
/// # Ok(())
/// # }
/// ```

use super::middleware::Principal;
use crate::models::task::TaskScope;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Authenticated, but not allowed
    #[error("Forbidden")]
    Forbidden,
}

/// Rows the principal may see: all of them for admins, their own otherwise
pub fn task_scope(principal: &Principal) -> TaskScope {
    TaskScope::new(principal.id(), principal.is_admin())
}

/// Gate for admin-only routes
pub fn require_admin(principal: &Principal) -> Result<(), AuthzError> {
    if !principal.is_admin() {
        return Err(AuthzError::Forbidden);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use chrono::Utc;
    use uuid::Uuid;

    fn principal(is_superuser: bool) -> Principal {
        Principal::new(User {
            id: Uuid::new_v4(),
            email: "p@example.com".to_string(),
            hashed_password: "hash".to_string(),
            name: None,
            is_active: true,
            is_superuser,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_task_scope() {
        let regular = principal(false);
        assert_eq!(task_scope(&regular), TaskScope::Owner(regular.id()));

        let admin = principal(true);
        assert_eq!(task_scope(&admin), TaskScope::All);
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&principal(true)).is_ok());
        assert!(matches!(
            require_admin(&principal(false)),
            Err(AuthzError::Forbidden)
        ));
    }
}
