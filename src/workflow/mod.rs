pub mod entity_ctx;
pub mod faculty_flow;

pub use entity_ctx::EntityCtx;
pub use faculty_flow::{EntityOutcome, FacultyFlow, ImageStatus};
