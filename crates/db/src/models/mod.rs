//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and, where rows are inserted from outside the generation pipeline, a
//! `Deserialize` create DTO.

pub mod course;
pub mod otp;
pub mod progress;
pub mod roadmap;
pub mod user;
