// Course registry, enrollments, and the faculty read-side.

pub mod handlers;
pub mod queries;
