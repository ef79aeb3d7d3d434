//! Course and roadmap generation workflows.
//!
//! - [`outline`] / [`chapter`] / [`roadmap`] -- prompt construction and the
//!   single generator call for each content shape.
//! - [`store`] -- the [`ContentStore`] seam the orchestrator persists through.
//! - [`orchestrator`] -- the per-course state machine: outline, course row,
//!   then chapters in order with a fixed delay between expansion calls.

pub mod chapter;
pub mod orchestrator;
pub mod outline;
pub mod roadmap;
pub mod store;

pub use orchestrator::{
    CourseGenerator, FailureReason, GenerationOutcome, GenerationReport, GenerationState,
};
pub use store::{ContentStore, PersistenceError, PgContentStore};
