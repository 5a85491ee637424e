mod pipeline;
pub mod tracing;

pub use pipeline::TestPipeline;
pub use tracing::{CapturedEvent, capture};
