pub mod auth;
pub mod course;
pub mod jobs;
pub mod progress;
pub mod roadmap;
