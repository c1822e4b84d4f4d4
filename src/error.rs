use burn::{config::ConfigError, record::RecorderError};
use thiserror::Error;

/// Errors raised while building, saving or restoring FNet layers.
#[derive(Debug, Error)]
pub enum FNetError {
    /// A hyperparameter is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A saved configuration could not be read.
    #[error("Failed to read configuration: {0}")]
    Config(#[from] ConfigError),

    /// Weights could not be written or read.
    #[error("Failed to record weights: {0:?}")]
    Recorder(RecorderError),

    /// Filesystem access failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<RecorderError> for FNetError {
    fn from(err: RecorderError) -> Self {
        FNetError::Recorder(err)
    }
}

/// Result type for FNet operations.
pub type Result<T> = std::result::Result<T, FNetError>;

/// Fails with [`FNetError::InvalidConfig`] unless `rate` is a finite value in `[0, 1)`.
pub(crate) fn check_rate(name: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
        return Err(FNetError::InvalidConfig(format!(
            "{name} must be in [0, 1), got {rate}"
        )));
    }
    Ok(())
}

/// Fails with [`FNetError::InvalidConfig`] when a width is zero.
pub(crate) fn check_width(name: &str, width: usize) -> Result<()> {
    if width == 0 {
        return Err(FNetError::InvalidConfig(format!("{name} must be positive")));
    }
    Ok(())
}
