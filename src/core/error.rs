use thiserror::Error;

/// Raised when a decision pass cannot run on the inputs it was given
///
/// These are programming errors on the caller's side. A faction must not act on them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("no candidates supplied to the {bank} bank")]
    NoCandidates { bank: &'static str },

    #[error("turn option enumerator returned no Wait option")]
    MissingWaitOption,

    #[error("{factions} factions paired with {snapshots} snapshots")]
    SnapshotCountMismatch { factions: usize, snapshots: usize },
}

/// Faction configuration problems, detected at load time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown rule in weight overrides: {0}")]
    UnknownRule(String),

    #[error("weight for rule {rule} is not finite: {value}")]
    NonFiniteWeight { rule: String, value: f64 },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum StrategosError {
    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Army not found: {0:?}")]
    ArmyNotFound(crate::core::types::ArmyId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StrategosError>;
