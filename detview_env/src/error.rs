//! Error types for the DetView host abstraction.

use thiserror::Error;

/// Errors that can occur when talking to a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The frame is not known to the transform service
    #[error("Unknown frame: '{0}'")]
    UnknownFrame(String),
    
    /// Both frames are known but share no common root
    #[error("No transform path from '{source_frame}' to '{target_frame}'")]
    Disconnected {
        source_frame: String,
        target_frame: String,
    },
    
    /// The frame graph loops back onto itself
    #[error("Frame cycle detected at '{0}'")]
    FrameCycle(String),
}

impl EnvError {
    /// Creates an unknown-frame error.
    pub fn unknown_frame(frame: impl Into<String>) -> Self {
        Self::UnknownFrame(frame.into())
    }
    
    /// Creates a disconnected-frames error.
    pub fn disconnected(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Disconnected {
            source_frame: source.into(),
            target_frame: target.into(),
        }
    }
}
