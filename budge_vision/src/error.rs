//! Error types for the budge engine and its collaborators.

/// Top-level error type for budge operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgeError {
    /// The frame source could not deliver a frame. Always fatal.
    #[error("Frame acquisition failed: {message}")]
    FrameAcquisition { message: String },

    #[error("Frame dimensions differ: background is {expected:?}, current is {actual:?}")]
    FrameMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Display control error: {message}")]
    Display { message: String },

    #[error("Alert error: {message}")]
    Alert { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using BudgeError.
pub type BudgeResult<T> = Result<T, BudgeError>;

impl BudgeError {
    pub fn frame_acquisition(msg: impl Into<String>) -> Self {
        Self::FrameAcquisition {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display {
            message: msg.into(),
        }
    }

    pub fn alert(msg: impl Into<String>) -> Self {
        Self::Alert {
            message: msg.into(),
        }
    }

    /// Whether this error came from the frame source.
    pub fn is_frame_acquisition(&self) -> bool {
        matches!(self, Self::FrameAcquisition { .. })
    }
}
