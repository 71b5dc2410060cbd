use std::path::PathBuf;

/// Result alias used across the crate.
pub type StillcastResult<T> = Result<T, StillcastError>;

/// Every failure a run can end with. None of them are retried.
#[derive(thiserror::Error, Debug)]
pub enum StillcastError {
    /// An input (image, audio, config) does not exist or is not a regular file.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An effect name that the catalog does not know.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// Rejected before any rendering work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Decoding, probing or rasterization failed in an external library or tool.
    #[error("media error: {0}")]
    Media(String),

    /// `ffmpeg` could not be started, fed, or exited unsuccessfully.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// Malformed JSON config or plan.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Context-wrapped I/O and other plumbing failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StillcastError {
    /// Build a [`StillcastError::FileNotFound`].
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    /// Build a [`StillcastError::UnknownEffect`].
    pub fn unknown_effect(name: impl Into<String>) -> Self {
        Self::UnknownEffect(name.into())
    }

    /// Build a [`StillcastError::InvalidConfiguration`].
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`StillcastError::Media`].
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`StillcastError::EncodingFailed`].
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingFailed(msg.into())
    }

    /// Build a [`StillcastError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
