pub mod course;
pub mod error;
pub mod generation;
pub mod otp;
pub mod roadmap;
pub mod roles;
pub mod slug;
pub mod types;
