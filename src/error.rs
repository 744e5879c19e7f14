use thiserror::Error;

/// Everything that can stop a map from being generated.
#[derive(Error, Debug)]
pub enum MapGenError {
    #[error("Unknown map builder '{0}'")]
    UnknownBuilder(String),

    #[error("No map builder selected")]
    MissingBuilder,

    #[error("Invalid map dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: i32,
        height: i32,
        reason: String,
    },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Config(#[from] serde_json::Error),
}

impl MapGenError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        MapGenError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
