use thiserror::Error;

/// Unified error type for Wiretap.
#[derive(Error, Debug)]
pub enum WiretapError {
    #[error("Outcome already set: {0}")]
    OutcomeAlreadySet(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl WiretapError {
    /// Short machine-readable tag, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            WiretapError::OutcomeAlreadySet(_) => "outcome_already_set",
            WiretapError::Config(_) => "config",
            WiretapError::Sink(_) => "sink",
            WiretapError::Io(_) => "io",
            WiretapError::Serde(_) => "serde",
        }
    }
}
