//! Witness co-signatures for microcredentials.
//!
//! A keyed collection of (faculty id, faculty name) pairs. Membership is
//! tested by exact id equality — never by searching a joined string, which
//! would let one id match inside another.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Witness {
    pub faculty_id: Uuid,
    pub faculty_name: String,
}

pub fn contains(witnesses: &[Witness], faculty_id: Uuid) -> bool {
    witnesses.iter().any(|w| w.faculty_id == faculty_id)
}

/// Adds a co-signer. Each faculty member may witness an item once.
pub fn add(
    witnesses: &mut Vec<Witness>,
    faculty_id: Uuid,
    faculty_name: &str,
) -> Result<(), AppError> {
    if contains(witnesses, faculty_id) {
        return Err(AppError::Conflict(
            "You have already witnessed this item".to_string(),
        ));
    }
    witnesses.push(Witness {
        faculty_id,
        faculty_name: faculty_name.to_string(),
    });
    Ok(())
}

/// Removes this faculty's entry. An empty set is a conflict; a non-empty set
/// that does not contain the caller is a silent no-op (`Ok(false)`).
pub fn remove(witnesses: &mut Vec<Witness>, faculty_id: Uuid) -> Result<bool, AppError> {
    if witnesses.is_empty() {
        return Err(AppError::Conflict(
            "This item has no witnesses to remove".to_string(),
        ));
    }
    let before = witnesses.len();
    witnesses.retain(|w| w.faculty_id != faculty_id);
    Ok(witnesses.len() < before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_then_duplicate_conflicts() {
        let mut set = Vec::new();
        let f1 = Uuid::new_v4();
        add(&mut set, f1, "Dr. A").unwrap();
        assert!(matches!(add(&mut set, f1, "Dr. A"), Err(AppError::Conflict(_))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_leaves_other_witnesses() {
        let mut set = Vec::new();
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        add(&mut set, f1, "Dr. A").unwrap();
        add(&mut set, f2, "Dr. B").unwrap();
        assert!(remove(&mut set, f1).unwrap());
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].faculty_id, f2);
    }

    #[test]
    fn test_remove_from_empty_set_conflicts() {
        let mut set: Vec<Witness> = Vec::new();
        assert!(matches!(
            remove(&mut set, Uuid::new_v4()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_remove_absent_member_is_noop() {
        let mut set = Vec::new();
        add(&mut set, Uuid::new_v4(), "Dr. A").unwrap();
        assert!(!remove(&mut set, Uuid::new_v4()).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_membership_is_exact_by_id() {
        // Two witnesses whose names contain each other must stay independent;
        // membership never falls back to substring matching.
        let mut set = Vec::new();
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        add(&mut set, f1, "Dr. Lee").unwrap();
        add(&mut set, f2, "Dr. Leeson").unwrap();
        assert!(contains(&set, f1));
        assert!(contains(&set, f2));
        assert!(remove(&mut set, f1).unwrap());
        assert!(contains(&set, f2));
        assert!(!contains(&set, f1));
    }
}
