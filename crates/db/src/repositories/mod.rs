//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod chapter_repo;
pub mod course_repo;
pub mod otp_repo;
pub mod progress_repo;
pub mod roadmap_repo;
pub mod section_repo;
pub mod user_repo;

pub use chapter_repo::ChapterRepo;
pub use course_repo::CourseRepo;
pub use otp_repo::OtpRepo;
pub use progress_repo::ProgressRepo;
pub use roadmap_repo::RoadmapRepo;
pub use section_repo::SectionRepo;
pub use user_repo::UserRepo;
