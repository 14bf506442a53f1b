pub mod channel;
pub mod config;
pub mod error;
pub mod evidence;

pub use channel::*;
pub use config::{load_dotenv, BanditConfig, Config, RulesConfig, ScoringConfig, SignalConfig};
pub use error::*;
pub use evidence::*;
