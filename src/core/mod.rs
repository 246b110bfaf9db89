pub mod config;
pub mod error;
pub mod types;

pub use config::FactionConfig;
pub use error::{ConfigError, DecisionError, Result, StrategosError};
