//! DetView Host Abstraction Layer
//!
//! This crate provides the "Sans-Host" abstraction that lets the DetView
//! display engine run inside any 3D viewer, or inside a test harness with
//! no viewer at all.
//!
//! # Core Concept: Collaborators as Traits
//!
//! The display engine never talks to a concrete renderer. Everything it
//! needs from the outside world goes through a small set of traits:
//! - Frames (`FrameTransformer::resolve()`)
//! - Solid markers (`MarkerSurface::add_marker()`, `clear_markers()`)
//! - Wireframe lines (`SceneResourceFactory::create_line()`)
//! - User-visible status (`StatusSink::set_status()`)
//! - Property widgets (`PropertyPanel::set_visible()`, `set_bounds()`)
//!
//! Two in-process hosts ship with the crate: [`StaticFrameTree`] for frame
//! resolution and [`RecordingScene`], which records every call so that the
//! engine can be driven and inspected deterministically.
//!
//! # Example
//!
//! ```ignore
//! use detview_env::{FrameTransformer, Header, Pose, StaticFrameTree};
//!
//! let mut tree = StaticFrameTree::new("map");
//! tree.add_frame("base_link", "map", Pose::translation(1.0, 0.0, 0.0));
//! let resolved = tree.resolve("base_link", &Pose::identity())?;
//! ```

mod error;
mod frame_tree;
mod recording;
mod scene;
mod transform;
mod types;

pub use error::EnvError;
pub use frame_tree::StaticFrameTree;
pub use recording::{PropertyState, RecordedLine, RecordingScene, StatusEntry};
pub use scene::{
    DisplayProperty, LineResource, MarkerSurface, PropertyPanel, SceneResourceFactory,
    StatusLevel, StatusSink,
};
pub use transform::FrameTransformer;
pub use types::{Header, Marker, MarkerKind, Pose, Rgba};
