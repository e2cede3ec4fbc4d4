//! Notification fan-out.
//!
//! Domain operations return typed events; `dispatch` converts each event to a
//! notification request and hands it to the `Notifier`. Delivery is
//! best-effort: the Postgres notifier swallows its own failures and only logs,
//! so a failed enqueue can never fail the operation that triggered it.

pub mod handlers;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    FacultyRequest,
    FacultyApproved,
    FacultyRejected,
    ProjectSubmission,
    ProjectValidated,
    ProjectUnvalidated,
    MicrocredentialWitnessed,
    MicrocredentialUnwitnessed,
    CourseEnrollment,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::FacultyRequest => "FACULTY_REQUEST",
            NotificationType::FacultyApproved => "FACULTY_APPROVED",
            NotificationType::FacultyRejected => "FACULTY_REJECTED",
            NotificationType::ProjectSubmission => "PROJECT_SUBMISSION",
            NotificationType::ProjectValidated => "PROJECT_VALIDATED",
            NotificationType::ProjectUnvalidated => "PROJECT_UNVALIDATED",
            NotificationType::MicrocredentialWitnessed => "MICROCREDENTIAL_WITNESSED",
            NotificationType::MicrocredentialUnwitnessed => "MICROCREDENTIAL_UNWITNESSED",
            NotificationType::CourseEnrollment => "COURSE_ENROLLMENT",
        }
    }
}

/// One notification ready for delivery.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub user_id: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_user_id: Option<Uuid>,
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<&'static str>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Best-effort delivery. Implementations must swallow their own failures.
    async fn emit(&self, request: NotificationRequest);
}

/// Production notifier: inserts a row into `notifications`.
pub struct PgNotifier {
    pool: PgPool,
}

impl PgNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for PgNotifier {
    async fn emit(&self, request: NotificationRequest) {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications
                (user_id, type, title, message, related_user_id, related_entity_id, related_entity_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(request.user_id)
        .bind(request.kind.as_str())
        .bind(&request.title)
        .bind(&request.message)
        .bind(request.related_user_id)
        .bind(request.related_entity_id)
        .bind(request.related_entity_type)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => info!(
                "Notification {} queued for user {}",
                request.kind.as_str(),
                request.user_id
            ),
            Err(e) => warn!(
                "Failed to queue notification {} for user {}: {e}",
                request.kind.as_str(),
                request.user_id
            ),
        }
    }
}

/// Events produced by domain operations. Converted to notifications by
/// `dispatch`; persistence success never depends on them.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    ProjectSubmitted {
        course_creator: Uuid,
        student_id: Uuid,
        student_name: String,
        item_id: Uuid,
    },
    ProjectValidated {
        owner: Uuid,
        faculty_id: Uuid,
        faculty_name: String,
        item_id: Uuid,
    },
    ProjectUnvalidated {
        owner: Uuid,
        faculty_id: Uuid,
        faculty_name: String,
        item_id: Uuid,
    },
    MicrocredentialWitnessed {
        owner: Uuid,
        faculty_id: Uuid,
        faculty_name: String,
        item_id: Uuid,
    },
    MicrocredentialUnwitnessed {
        owner: Uuid,
        faculty_id: Uuid,
        faculty_name: String,
        item_id: Uuid,
    },
    StudentEnrolled {
        student: Uuid,
        course_name: String,
        faculty_id: Uuid,
    },
    FacultyRequested {
        admin: Uuid,
        faculty_id: Uuid,
        faculty_name: String,
    },
    FacultyReviewed {
        faculty: Uuid,
        approved: bool,
    },
}

/// Builds the notification for a domain event.
pub fn notification_for(event: &DomainEvent) -> NotificationRequest {
    match event {
        DomainEvent::ProjectSubmitted {
            course_creator,
            student_id,
            student_name,
            item_id,
        } => NotificationRequest {
            user_id: *course_creator,
            kind: NotificationType::ProjectSubmission,
            title: "New Project Submission".to_string(),
            message: format!("{student_name} submitted a project."),
            related_user_id: Some(*student_id),
            related_entity_id: Some(*item_id),
            related_entity_type: Some("PROJECT"),
        },
        DomainEvent::ProjectValidated {
            owner,
            faculty_id,
            faculty_name,
            item_id,
        } => NotificationRequest {
            user_id: *owner,
            kind: NotificationType::ProjectValidated,
            title: "Project Validated".to_string(),
            message: format!("{faculty_name} validated your project."),
            related_user_id: Some(*faculty_id),
            related_entity_id: Some(*item_id),
            related_entity_type: Some("PROJECT"),
        },
        DomainEvent::ProjectUnvalidated {
            owner,
            faculty_id,
            faculty_name,
            item_id,
        } => NotificationRequest {
            user_id: *owner,
            kind: NotificationType::ProjectUnvalidated,
            title: "Project Validation Removed".to_string(),
            message: format!("{faculty_name} removed the validation from your project."),
            related_user_id: Some(*faculty_id),
            related_entity_id: Some(*item_id),
            related_entity_type: Some("PROJECT"),
        },
        DomainEvent::MicrocredentialWitnessed {
            owner,
            faculty_id,
            faculty_name,
            item_id,
        } => NotificationRequest {
            user_id: *owner,
            kind: NotificationType::MicrocredentialWitnessed,
            title: "Microcredential Witnessed".to_string(),
            message: format!("{faculty_name} witnessed your microcredential."),
            related_user_id: Some(*faculty_id),
            related_entity_id: Some(*item_id),
            related_entity_type: Some("MICROCREDENTIAL"),
        },
        DomainEvent::MicrocredentialUnwitnessed {
            owner,
            faculty_id,
            faculty_name,
            item_id,
        } => NotificationRequest {
            user_id: *owner,
            kind: NotificationType::MicrocredentialUnwitnessed,
            title: "Witness Removed".to_string(),
            message: format!("{faculty_name} withdrew their witness from your microcredential."),
            related_user_id: Some(*faculty_id),
            related_entity_id: Some(*item_id),
            related_entity_type: Some("MICROCREDENTIAL"),
        },
        DomainEvent::StudentEnrolled {
            student,
            course_name,
            faculty_id,
        } => NotificationRequest {
            user_id: *student,
            kind: NotificationType::CourseEnrollment,
            title: "Course Enrollment Confirmed".to_string(),
            message: format!("You have been enrolled in {course_name}."),
            related_user_id: Some(*faculty_id),
            related_entity_id: None,
            related_entity_type: Some("COURSE"),
        },
        DomainEvent::FacultyRequested {
            admin,
            faculty_id,
            faculty_name,
        } => NotificationRequest {
            user_id: *admin,
            kind: NotificationType::FacultyRequest,
            title: "New Faculty Request".to_string(),
            message: format!("{faculty_name} has requested faculty access."),
            related_user_id: Some(*faculty_id),
            related_entity_id: None,
            related_entity_type: None,
        },
        DomainEvent::FacultyReviewed { faculty, approved } => {
            if *approved {
                NotificationRequest {
                    user_id: *faculty,
                    kind: NotificationType::FacultyApproved,
                    title: "Faculty Account Approved".to_string(),
                    message: "Your faculty account has been approved. You can now access the faculty dashboard."
                        .to_string(),
                    related_user_id: None,
                    related_entity_id: None,
                    related_entity_type: None,
                }
            } else {
                NotificationRequest {
                    user_id: *faculty,
                    kind: NotificationType::FacultyRejected,
                    title: "Faculty Account Rejected".to_string(),
                    message: "Your faculty account request has been rejected.".to_string(),
                    related_user_id: None,
                    related_entity_id: None,
                    related_entity_type: None,
                }
            }
        }
    }
}

/// Emits one notification per event. Never fails the caller.
pub async fn dispatch(notifier: &dyn Notifier, events: &[DomainEvent]) {
    for event in events {
        notifier.emit(notification_for(event)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_submission_addresses_course_creator() {
        let creator = Uuid::new_v4();
        let student = Uuid::new_v4();
        let item = Uuid::new_v4();
        let request = notification_for(&DomainEvent::ProjectSubmitted {
            course_creator: creator,
            student_id: student,
            student_name: "Ada Lovelace".to_string(),
            item_id: item,
        });
        assert_eq!(request.user_id, creator);
        assert_eq!(request.kind, NotificationType::ProjectSubmission);
        assert_eq!(request.message, "Ada Lovelace submitted a project.");
        assert_eq!(request.related_user_id, Some(student));
        assert_eq!(request.related_entity_id, Some(item));
    }

    #[test]
    fn test_validation_notifications_address_owner() {
        let owner = Uuid::new_v4();
        let faculty = Uuid::new_v4();
        let request = notification_for(&DomainEvent::ProjectValidated {
            owner,
            faculty_id: faculty,
            faculty_name: "Grace Hopper".to_string(),
            item_id: Uuid::new_v4(),
        });
        assert_eq!(request.user_id, owner);
        assert_eq!(request.kind, NotificationType::ProjectValidated);
        assert!(request.message.contains("Grace Hopper"));
    }

    #[test]
    fn test_faculty_review_branches_on_outcome() {
        let faculty = Uuid::new_v4();
        let approved = notification_for(&DomainEvent::FacultyReviewed {
            faculty,
            approved: true,
        });
        assert_eq!(approved.kind, NotificationType::FacultyApproved);
        let rejected = notification_for(&DomainEvent::FacultyReviewed {
            faculty,
            approved: false,
        });
        assert_eq!(rejected.kind, NotificationType::FacultyRejected);
        assert_eq!(rejected.user_id, faculty);
    }

    #[test]
    fn test_type_strings_match_storage_format() {
        assert_eq!(
            NotificationType::MicrocredentialWitnessed.as_str(),
            "MICROCREDENTIAL_WITNESSED"
        );
        assert_eq!(NotificationType::FacultyRequest.as_str(), "FACULTY_REQUEST");
    }
}
