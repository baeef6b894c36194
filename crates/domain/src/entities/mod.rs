//! Domain entities - Per-utterance request and result records

mod pipeline;

pub use pipeline::{PipelineRequest, PipelineResult, SPEED_RANGE, TtsOptions};
