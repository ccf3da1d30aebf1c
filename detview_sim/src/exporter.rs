//! JSON exporter for replayed display output.
//!
//! Each exported frame is what the display showed after one message:
//! solid boxes, score labels and wireframes in world coordinates, plus the
//! transform status if one is set.

use detview_env::{Marker, MarkerKind, RecordedLine};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single frame of display output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Message index
    pub index: u64,
    
    /// Message stamp in seconds
    pub time_sec: f64,
    
    /// "edges" or "boxes"
    pub mode: String,
    
    /// Solid boxes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub boxes: Vec<BoxRecord>,
    
    /// Score labels
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelRecord>,
    
    /// Wireframes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeRecord>,
    
    /// Transform status message, if an error is shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A solid box marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxRecord {
    pub id: usize,
    pub frame_id: String,
    pub center: [f64; 3],
    /// Orientation as [x, y, z, w]
    pub orientation: [f64; 4],
    pub size: [f64; 3],
    pub color: [u8; 4],
}

impl BoxRecord {
    pub fn from_marker(marker: &Marker) -> Self {
        let t = marker.pose.translation.vector;
        let q = marker.pose.rotation.coords;
        Self {
            id: marker.id,
            frame_id: marker.header.frame_id.clone(),
            center: [t.x, t.y, t.z],
            orientation: [q.x, q.y, q.z, q.w],
            size: [marker.scale.x, marker.scale.y, marker.scale.z],
            color: marker.color.to_rgba8(),
        }
    }
}

/// A text marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRecord {
    pub id: usize,
    pub text: String,
    pub position: [f64; 3],
}

impl LabelRecord {
    /// Returns `None` for non-text markers.
    pub fn from_marker(marker: &Marker) -> Option<Self> {
        let MarkerKind::Text(text) = &marker.kind else {
            return None;
        };
        let t = marker.pose.translation.vector;
        Some(Self {
            id: marker.id,
            text: text.clone(),
            position: [t.x, t.y, t.z],
        })
    }
}

/// A wireframe, segments in world coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: usize,
    pub width: f32,
    pub color: [u8; 4],
    pub segments: Vec<[[f64; 3]; 2]>,
}

impl EdgeRecord {
    pub fn from_line(id: usize, line: &RecordedLine) -> Self {
        let world = |p: &Point3<f64>| {
            let p = line.pose().transform_point(p);
            [p.x, p.y, p.z]
        };
        let segments = line
            .lines()
            .iter()
            .filter(|points| points.len() == 2)
            .map(|points| [world(&points[0]), world(&points[1])])
            .collect();
        
        Self {
            id,
            width: line.line_width(),
            color: line.color().to_rgba8(),
            segments,
        }
    }
}

/// Complete replay export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Topic name
    pub topic: String,
    
    /// Seed used
    pub seed: u64,
    
    /// Frame every wireframe is expressed in
    pub fixed_frame: String,
    
    /// All frames
    pub frames: Vec<SimFrame>,
    
    /// Display settings at the end of the run
    pub final_config: serde_json::Value,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(topic: &str, seed: u64, fixed_frame: &str) -> Self {
        Self {
            topic: topic.to_string(),
            seed,
            fixed_frame: fixed_frame.to_string(),
            frames: Vec::new(),
            final_config: serde_json::Value::Null,
        }
    }
    
    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }
    
    /// Finalizes the export.
    pub fn finalize(&mut self, config: serde_json::Value) {
        self.final_config = config;
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
