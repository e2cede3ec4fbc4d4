//! Authorization policy.
//!
//! One predicate per access rule, taking (caller, resource ownership) instead
//! of role conditionals scattered through handlers. Every handler states its
//! rule with exactly one of these.

use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::Role;

/// The caller must own the resource.
pub fn require_owner(caller: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if caller.id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The caller must hold the FACULTY role.
pub fn require_faculty(caller: &AuthUser) -> Result<(), AppError> {
    if caller.role == Role::Faculty {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The caller must hold the ADMIN role.
pub fn require_admin(caller: &AuthUser) -> Result<(), AppError> {
    if caller.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The caller must own the resource or be an admin.
pub fn require_owner_or_admin(caller: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if caller.id == owner_id || caller.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The caller must own the resource, or be faculty or an admin. Faculty read
/// items to decide on validation, so item reads use this rule.
pub fn require_owner_or_staff(caller: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if caller.id == owner_id || caller.role == Role::Faculty || caller.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The caller must be the faculty member who created the course.
pub fn require_course_creator(caller: &AuthUser, created_by: Uuid) -> Result<(), AppError> {
    require_faculty(caller)?;
    if caller.id == created_by {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            role,
            display_name: "Test User".to_string(),
        }
    }

    #[test]
    fn test_owner_check() {
        let caller = user(Role::Student);
        assert!(require_owner(&caller, caller.id).is_ok());
        assert!(require_owner(&caller, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_faculty_check() {
        assert!(require_faculty(&user(Role::Faculty)).is_ok());
        assert!(require_faculty(&user(Role::Student)).is_err());
        assert!(require_faculty(&user(Role::Admin)).is_err());
    }

    #[test]
    fn test_admin_check() {
        assert!(require_admin(&user(Role::Admin)).is_ok());
        assert!(require_admin(&user(Role::Faculty)).is_err());
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = user(Role::Student);
        assert!(require_owner_or_admin(&owner, owner.id).is_ok());
        assert!(require_owner_or_admin(&user(Role::Admin), owner.id).is_ok());
        assert!(require_owner_or_admin(&user(Role::Faculty), owner.id).is_err());
    }

    #[test]
    fn test_owner_or_staff_admits_faculty() {
        let owner = user(Role::Student);
        assert!(require_owner_or_staff(&owner, owner.id).is_ok());
        assert!(require_owner_or_staff(&user(Role::Faculty), owner.id).is_ok());
        assert!(require_owner_or_staff(&user(Role::Admin), owner.id).is_ok());
        assert!(require_owner_or_staff(&user(Role::Student), owner.id).is_err());
    }

    #[test]
    fn test_course_creator_requires_faculty_role() {
        let creator = user(Role::Faculty);
        assert!(require_course_creator(&creator, creator.id).is_ok());
        assert!(require_course_creator(&creator, Uuid::new_v4()).is_err());
        // An admin with a matching id is still not the course's faculty.
        let admin = user(Role::Admin);
        assert!(require_course_creator(&admin, admin.id).is_err());
    }
}
