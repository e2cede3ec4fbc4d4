//! Faculty endorsement transitions.
//!
//! Validation applies to projects and is gated on course ownership when the
//! item carries a course code; witnessing applies to microcredentials and is
//! open to any faculty member (an intentional asymmetry carried over from the
//! existing product behavior). Checks run in a fixed order: category, then
//! course gate, then state conflict — so an unauthorized caller learns nothing
//! about the item's validation state.
//!
//! These functions mutate in-memory rows and return the events to fan out;
//! the caller persists and dispatches.

use chrono::Utc;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::course::CourseRow;
use crate::models::portfolio::PortfolioItemRow;
use crate::notifications::DomainEvent;
use crate::portfolio::witness::{self, Witness};

fn ensure_project(item: &PortfolioItemRow) -> Result<(), AppError> {
    if !item.is_project() {
        return Err(AppError::Validation(
            "Only project items can be validated".to_string(),
        ));
    }
    Ok(())
}

fn ensure_microcredential(item: &PortfolioItemRow) -> Result<(), AppError> {
    if !item.is_microcredential() {
        return Err(AppError::Validation(
            "Only microcredential items can be witnessed".to_string(),
        ));
    }
    Ok(())
}

/// When the item carries a course code that resolves to a course, only the
/// course's creator may validate. An unresolvable code leaves validation open
/// to any faculty member.
fn ensure_course_gate(
    item: &PortfolioItemRow,
    faculty: &AuthUser,
    course: Option<&CourseRow>,
) -> Result<(), AppError> {
    if item.course_code.is_some() {
        if let Some(course) = course {
            if course.created_by != faculty.id {
                return Err(AppError::Forbidden);
            }
        }
    }
    Ok(())
}

pub fn validate_project(
    item: &mut PortfolioItemRow,
    faculty: &AuthUser,
    course: Option<&CourseRow>,
) -> Result<DomainEvent, AppError> {
    ensure_project(item)?;
    ensure_course_gate(item, faculty, course)?;
    if item.validated_by_faculty {
        return Err(AppError::Conflict(
            "This item has already been validated".to_string(),
        ));
    }
    item.validated_by_faculty = true;
    item.validated_by_id = Some(faculty.id);
    item.validated_by_name = Some(faculty.display_name.clone());
    item.updated_at = Utc::now();
    Ok(DomainEvent::ProjectValidated {
        owner: item.owner_id,
        faculty_id: faculty.id,
        faculty_name: faculty.display_name.clone(),
        item_id: item.id,
    })
}

pub fn unvalidate_project(
    item: &mut PortfolioItemRow,
    faculty: &AuthUser,
    course: Option<&CourseRow>,
) -> Result<DomainEvent, AppError> {
    ensure_project(item)?;
    ensure_course_gate(item, faculty, course)?;
    if !item.validated_by_faculty {
        return Err(AppError::Conflict(
            "This item is not validated".to_string(),
        ));
    }
    item.validated_by_faculty = false;
    item.validated_by_id = None;
    item.validated_by_name = None;
    item.updated_at = Utc::now();
    Ok(DomainEvent::ProjectUnvalidated {
        owner: item.owner_id,
        faculty_id: faculty.id,
        faculty_name: faculty.display_name.clone(),
        item_id: item.id,
    })
}

/// Adds the caller to the witness set. No course gate here.
pub fn witness_microcredential(
    item: &PortfolioItemRow,
    witnesses: &mut Vec<Witness>,
    faculty: &AuthUser,
) -> Result<DomainEvent, AppError> {
    ensure_microcredential(item)?;
    witness::add(witnesses, faculty.id, &faculty.display_name)?;
    Ok(DomainEvent::MicrocredentialWitnessed {
        owner: item.owner_id,
        faculty_id: faculty.id,
        faculty_name: faculty.display_name.clone(),
        item_id: item.id,
    })
}

/// Removes the caller from the witness set. Returns `None` (and no event)
/// when the set was non-empty but the caller was not in it.
pub fn unwitness_microcredential(
    item: &PortfolioItemRow,
    witnesses: &mut Vec<Witness>,
    faculty: &AuthUser,
) -> Result<Option<DomainEvent>, AppError> {
    ensure_microcredential(item)?;
    let removed = witness::remove(witnesses, faculty.id)?;
    if !removed {
        return Ok(None);
    }
    Ok(Some(DomainEvent::MicrocredentialUnwitnessed {
        owner: item.owner_id,
        faculty_id: faculty.id,
        faculty_name: faculty.display_name.clone(),
        item_id: item.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn faculty(name: &str) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            role: Role::Faculty,
            display_name: name.to_string(),
        }
    }

    fn item(category: &str) -> PortfolioItemRow {
        PortfolioItemRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category: category.to_string(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            github_link: None,
            course_code: None,
            cert_title: None,
            issue_date: None,
            cert_file: None,
            public_token: "tok".to_string(),
            validated_by_faculty: false,
            validated_by_id: None,
            validated_by_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn course(code: &str, created_by: Uuid) -> CourseRow {
        CourseRow {
            course_code: code.to_string(),
            course_name: "Intro".to_string(),
            created_by,
            created_by_name: "Dr. Creator".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_records_identity_and_emits_event() {
        let mut item = item("project");
        let f = faculty("Grace Hopper");
        let event = validate_project(&mut item, &f, None).unwrap();
        assert!(item.validated_by_faculty);
        assert_eq!(item.validated_by_id, Some(f.id));
        assert_eq!(item.validated_by_name.as_deref(), Some("Grace Hopper"));
        assert!(matches!(event, DomainEvent::ProjectValidated { owner, .. } if owner == item.owner_id));
    }

    #[test]
    fn test_validate_twice_conflicts() {
        let mut item = item("project");
        let f = faculty("Grace Hopper");
        validate_project(&mut item, &f, None).unwrap();
        assert!(matches!(
            validate_project(&mut item, &f, None),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_validate_wrong_category_rejected() {
        let mut item = item("microcredential");
        assert!(matches!(
            validate_project(&mut item, &faculty("F"), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_course_gate_blocks_other_faculty() {
        let mut item = item("project");
        item.course_code = Some("CS101".to_string());
        let creator = faculty("Dr. Creator");
        let other = faculty("Dr. Other");
        let course = course("CS101", creator.id);
        assert!(matches!(
            validate_project(&mut item, &other, Some(&course)),
            Err(AppError::Forbidden)
        ));
        assert!(!item.validated_by_faculty);
        assert!(validate_project(&mut item, &creator, Some(&course)).is_ok());
    }

    #[test]
    fn test_course_gate_checked_before_conflict() {
        // Non-creator calling validate on an already-validated course item
        // gets Forbidden, not Conflict: authorization is checked first.
        let mut item = item("project");
        item.course_code = Some("CS101".to_string());
        let creator = faculty("Dr. Creator");
        let other = faculty("Dr. Other");
        let course = course("CS101", creator.id);
        validate_project(&mut item, &creator, Some(&course)).unwrap();
        assert!(matches!(
            validate_project(&mut item, &other, Some(&course)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_unresolvable_course_code_leaves_validation_open() {
        let mut item = item("project");
        item.course_code = Some("GHOST-101".to_string());
        assert!(validate_project(&mut item, &faculty("F"), None).is_ok());
    }

    #[test]
    fn test_unvalidate_resets_identity() {
        let mut item = item("project");
        let f = faculty("Grace Hopper");
        validate_project(&mut item, &f, None).unwrap();
        let event = unvalidate_project(&mut item, &f, None).unwrap();
        assert!(!item.validated_by_faculty);
        assert!(item.validated_by_id.is_none());
        assert!(item.validated_by_name.is_none());
        assert!(matches!(event, DomainEvent::ProjectUnvalidated { .. }));
        // And a fresh validation succeeds again.
        assert!(validate_project(&mut item, &f, None).is_ok());
    }

    #[test]
    fn test_unvalidate_unvalidated_conflicts() {
        let mut item = item("project");
        assert!(matches!(
            unvalidate_project(&mut item, &faculty("F"), None),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_witness_requires_microcredential() {
        let item = item("project");
        let mut set = Vec::new();
        assert!(matches!(
            witness_microcredential(&item, &mut set, &faculty("F")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_witness_set_accumulates_and_removes() {
        let item = item("microcredential");
        let f1 = faculty("Dr. A");
        let f2 = faculty("Dr. B");
        let mut set = Vec::new();
        witness_microcredential(&item, &mut set, &f1).unwrap();
        witness_microcredential(&item, &mut set, &f2).unwrap();
        assert!(matches!(
            witness_microcredential(&item, &mut set, &f1),
            Err(AppError::Conflict(_))
        ));
        let event = unwitness_microcredential(&item, &mut set, &f1).unwrap();
        assert!(event.is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].faculty_id, f2.id);
    }

    #[test]
    fn test_unwitness_absent_faculty_is_silent_noop() {
        let item = item("microcredential");
        let mut set = Vec::new();
        witness_microcredential(&item, &mut set, &faculty("Dr. A")).unwrap();
        let event = unwitness_microcredential(&item, &mut set, &faculty("Dr. B")).unwrap();
        assert!(event.is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unwitness_empty_set_conflicts() {
        let item = item("microcredential");
        let mut set = Vec::new();
        assert!(matches!(
            unwitness_microcredential(&item, &mut set, &faculty("F")),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_witnessing_has_no_course_gate() {
        // Unlike validate, witnessing an item tied to someone else's course
        // is allowed for any faculty member.
        let mut item = item("microcredential");
        item.course_code = Some("CS101".to_string());
        let mut set = Vec::new();
        assert!(witness_microcredential(&item, &mut set, &faculty("Dr. Other")).is_ok());
    }
}
