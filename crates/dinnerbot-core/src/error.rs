use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Rejections raised while building a [`crate::TriggerSpec`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("hour {0} is out of range (expected 0-23)")]
    HourOutOfRange(u32),

    #[error("minute {0} is out of range (expected 0-59)")]
    MinuteOutOfRange(u32),

    #[error("unknown timezone \"{0}\"")]
    UnknownTimezone(String),
}
