//! Lead decision pipeline: runs signal probes, scores the lead with rule
//! packs and, unless it is skipped, picks an outreach channel.

pub mod error;
pub mod pipeline;
pub mod types;

pub use error::{DecisionError, Result};
pub use pipeline::{DecisionPipeline, RuleSource};
pub use types::{ChannelPick, Decision, DecisionRequest, OutcomeEvent};
