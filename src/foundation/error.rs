use std::path::PathBuf;

/// Convenience result type used across stillmotion.
pub type StillmotionResult<T> = Result<T, StillmotionError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// "No face detected" is not represented here: locators report it as `Ok(None)`.
#[derive(thiserror::Error, Debug)]
pub enum StillmotionError {
    /// Input image path does not resolve to a file.
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input exists but does not decode into a usable pixel buffer.
    #[error("invalid image '{}': {reason}", path.display())]
    InvalidImage {
        /// Offending input path.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The face locator malfunctioned (distinct from finding no face).
    #[error("face detection error: {0}")]
    FaceDetection(String),

    /// Invalid settings, or a sink that cannot be opened at the requested geometry/rate.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Write or finalize failure while producing output.
    #[error("io error: {0}")]
    Io(String),

    /// A pipeline step was invoked from the wrong state.
    #[error("pipeline state error: {0}")]
    State(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StillmotionError {
    /// Build a [`StillmotionError::InvalidImage`] value.
    pub fn invalid_image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`StillmotionError::FaceDetection`] value.
    pub fn face_detection(msg: impl Into<String>) -> Self {
        Self::FaceDetection(msg.into())
    }

    /// Build a [`StillmotionError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`StillmotionError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`StillmotionError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
