/// Convenience result type used across framefit.
pub type FramefitResult<T> = Result<T, FramefitError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Transient conditions are not errors here: a frame with no detected face is
/// surfaced as absence (`Option`/state), and camera/detector failures are
/// states of the lifecycle machine, carried as
/// [`CameraErrorKind`](crate::CameraErrorKind) values rather than `Err`s.
#[derive(thiserror::Error, Debug)]
pub enum FramefitError {
    /// Invalid user-provided configuration or model data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Misuse of the session lifecycle (e.g. pumping frames while not ready).
    #[error("session error: {0}")]
    Session(String),

    /// Errors resolving or consuming prepared frame assets.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramefitError {
    /// Build a [`FramefitError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramefitError::Session`] value.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Build a [`FramefitError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FramefitError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
