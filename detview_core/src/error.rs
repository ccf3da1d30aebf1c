//! Error types for the display engine.

use detview_env::EnvError;
use thiserror::Error;

/// A detection pose could not be resolved into the fixed frame.
///
/// This is the only error a render pass produces. It aborts the current
/// edge pass and is surfaced as a display status; it never drops the
/// retained message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error transforming pose from frame '{source_frame}' to frame '{target_frame}'")]
pub struct TransformError {
    /// Frame the detection was expressed in
    pub source_frame: String,
    
    /// The display's fixed frame
    pub target_frame: String,
    
    /// What the transform service reported
    #[source]
    pub reason: EnvError,
}

/// Errors raised while loading a configuration blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The blob is not a JSON object
    #[error("Config blob must be a JSON object, got {0}")]
    NotAnObject(String),
    
    /// A known key holds a value of the wrong JSON type
    #[error("Property '{property}' expects a {expected}, got {found}")]
    WrongType {
        property: &'static str,
        expected: &'static str,
        found: String,
    },
}
