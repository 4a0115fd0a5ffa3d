use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("ranging sensor disconnected")]
    Disconnected,
    #[error("display unreachable: {0}")]
    DisplayUnreachable(String),
    #[error("environment sensor not responding")]
    EnvironmentUnavailable,
}

pub type Result<T> = std::result::Result<T, HwError>;
