use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    /// Fewer than two valid stable readings were collected during a scan.
    #[error("insufficient data: {valid} valid readings out of {attempts} attempts (need at least 2)")]
    InsufficientData { valid: usize, attempts: u32 },
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing ranging sensor")]
    MissingSensor,
    #[error("missing display")]
    MissingDisplay,
    #[error("missing buzzer")]
    MissingBuzzer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
