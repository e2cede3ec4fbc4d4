pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::courses::handlers as courses;
use crate::notifications::handlers as notifications;
use crate::portfolio::handlers as portfolio;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // User directory
        .route(
            "/api/v1/users",
            post(users::handle_signup).get(users::handle_find_by_username),
        )
        .route("/api/v1/users/:id", get(users::handle_get_user))
        .route(
            "/api/v1/users/:id/review",
            patch(users::handle_review_faculty),
        )
        .route(
            "/api/v1/users/:id/portfolio-items",
            get(portfolio::handle_list_user_items),
        )
        .route(
            "/api/v1/users/:id/resume",
            post(resume::handle_generate_resume),
        )
        // Portfolio items
        .route(
            "/api/v1/portfolio-items",
            post(portfolio::handle_create_item),
        )
        .route(
            "/api/v1/portfolio-items/public/:token",
            get(portfolio::handle_resolve_public),
        )
        .route(
            "/api/v1/portfolio-items/:id",
            get(portfolio::handle_get_item)
                .put(portfolio::handle_update_item)
                .delete(portfolio::handle_delete_item),
        )
        .route(
            "/api/v1/portfolio-items/:id/visibility",
            patch(portfolio::handle_set_visibility),
        )
        .route(
            "/api/v1/portfolio-items/:id/validate",
            patch(portfolio::handle_validate),
        )
        .route(
            "/api/v1/portfolio-items/:id/unvalidate",
            patch(portfolio::handle_unvalidate),
        )
        .route(
            "/api/v1/portfolio-items/:id/witness",
            patch(portfolio::handle_witness),
        )
        .route(
            "/api/v1/portfolio-items/:id/unwitness",
            patch(portfolio::handle_unwitness),
        )
        // Courses and enrollment
        .route(
            "/api/v1/courses",
            post(courses::handle_create_course).get(courses::handle_list_courses),
        )
        .route("/api/v1/courses/mine", get(courses::handle_my_courses))
        .route(
            "/api/v1/courses/:code/projects",
            get(courses::handle_course_projects),
        )
        .route(
            "/api/v1/courses/:code/students",
            get(courses::handle_course_students),
        )
        .route(
            "/api/v1/courses/:code/enrollments",
            post(courses::handle_enroll),
        )
        .route(
            "/api/v1/courses/:code/enrollments/:student_id",
            delete(courses::handle_unenroll),
        )
        .route(
            "/api/v1/students/:id/courses",
            get(courses::handle_student_courses),
        )
        // Notifications
        .route(
            "/api/v1/notifications",
            get(notifications::handle_list_notifications),
        )
        .route(
            "/api/v1/notifications/:id/read",
            patch(notifications::handle_mark_read),
        )
        .with_state(state)
}
