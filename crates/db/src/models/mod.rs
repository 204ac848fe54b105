//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` row struct matching the database table
//! - A `Deserialize` create DTO for inserts
//! - A conversion into the matching `presenca_core` domain type

pub mod class_instance;
pub mod schedule_template;
pub mod special_session;
