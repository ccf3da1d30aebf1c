//! DetView Sample Replay Harness
//!
//! Replays the three sample topics through a `DetectionDisplay` so the whole
//! render path can be exercised without a viewer:
//! - **Publishers**: counter-driven geometry, seeded random scores and labels
//! - **Runner**: drives the display, optionally flipping modes mid-stream
//! - **Exporter**: captures boxes, labels and wireframes per frame as JSON
//!
//! # Usage
//!
//! ```ignore
//! use detview_sim::{SampleTopic, SimConfig, SimRunner};
//!
//! let config = SimConfig {
//!     topic: SampleTopic::Array,
//!     edge_only: true,
//!     ..Default::default()
//! };
//!
//! let summary = SimRunner::new(config).run()?;
//! ```

mod exporter;
mod publisher;
mod runner;
pub mod topics;

pub use exporter::{BoxRecord, EdgeRecord, LabelRecord, SimExport, SimFrame};
pub use publisher::{SamplePublisher, GRID_SIZE, SAMPLE_LABELS, SAMPLE_SCORES};
pub use runner::{sample_frame_tree, RunSummary, SimConfig, SimError, SimRunner};
pub use topics::SampleTopic;
