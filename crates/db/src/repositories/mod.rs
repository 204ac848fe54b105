//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod class_instance_repo;
pub mod schedule_template_repo;
pub mod special_session_repo;

pub use class_instance_repo::ClassInstanceRepo;
pub use schedule_template_repo::ScheduleTemplateRepo;
pub use special_session_repo::SpecialSessionRepo;
