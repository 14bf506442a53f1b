//! Contextual Thompson-sampling bandit that picks an outreach channel per
//! segment and learns from recorded outcomes.

pub mod bandit;
pub mod context;
pub mod error;
pub mod rng;
pub mod sampling;
pub mod stable_hash;
pub mod stats;
pub mod store;

pub use bandit::{ArmDebug, ChannelBandit, SelectOptions, Selection, SelectionDebug};
pub use context::{segment_key, BanditContext};
pub use error::{BanditError, Result, StoreError};
pub use rng::{RandomSource, SequenceRandom, StdRandom};
pub use stats::{ArmStats, Outcome, Prior, SegmentStats};
pub use store::{BanditStore, FileStore, MemoryStore};
