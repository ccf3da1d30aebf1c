//! DetView Core - 3D Detection Array Display Engine
//!
//! Turns streams of 3D object detections into scene content:
//! 1. **Solid boxes**: one translucent cube marker per detection, colored by tracking state or class
//! 2. **Wireframes**: twelve-edge line resources resolved into the fixed frame
//! 3. **Score labels**: optional text markers above each box
//!
//! The host (frames, markers, line resources, status, properties) is injected
//! through the traits in `detview_env`, so the engine runs the same against a
//! real viewer or the in-memory `RecordingScene`.

pub mod color;
pub mod config;
pub mod display;
pub mod edge_pool;
pub mod error;
pub mod geometry;
pub mod messages;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use color::{color_for, detection_color, ObjectClass};
pub use config::{ConfigChange, DisplayConfig};
pub use display::{DetectionDisplay, DisplayHost, DisplayState};
pub use edge_pool::EdgePool;
pub use error::{ConfigError, TransformError};
pub use geometry::{build_box, build_edges, build_score_label, Wireframe};
pub use messages::{BoundingBox3D, Detection3D, Detection3DArray, ObjectHypothesis};

#[cfg(feature = "visualization")]
pub use visualization::RerunScene;
