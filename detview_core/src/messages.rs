//! Detection message model.
//!
//! Messages are created by the transport layer and are read-only to the
//! display. A lone [`Detection3D`] or a bare [`BoundingBox3D`] is displayed
//! as a one-element [`Detection3DArray`], so there is a single render path.

use detview_env::{Header, Pose};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One class hypothesis for a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectHypothesis {
    /// Class label (e.g. "car"), may be empty
    pub class_id: String,
    
    /// Confidence score
    pub score: f64,
}

impl ObjectHypothesis {
    pub fn new(class_id: impl Into<String>, score: f64) -> Self {
        Self {
            class_id: class_id.into(),
            score,
        }
    }
}

/// An oriented 3D box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3D {
    /// Pose of the box center
    pub center: Pose,
    
    /// Full extent along the box's local x (width), y (depth), z (height)
    pub size: Vector3<f64>,
}

impl BoundingBox3D {
    pub fn new(center: Pose, size: Vector3<f64>) -> Self {
        Self { center, size }
    }
}

/// A single 3D detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection3D {
    /// Header of the detection itself
    pub header: Header,
    
    /// Class hypotheses, in no particular order
    pub results: Vec<ObjectHypothesis>,
    
    /// Oriented bounding box
    pub bbox: BoundingBox3D,
    
    /// Tracking id, empty if unknown
    #[serde(default)]
    pub id: String,
    
    /// True if the detection comes from a tracker
    #[serde(default)]
    pub is_tracking: bool,
}

impl Detection3D {
    /// Creates an untracked detection without hypotheses.
    pub fn new(header: Header, bbox: BoundingBox3D) -> Self {
        Self {
            header,
            results: Vec::new(),
            bbox,
            id: String::new(),
            is_tracking: false,
        }
    }
    
    /// Adds a class hypothesis.
    pub fn with_result(mut self, class_id: impl Into<String>, score: f64) -> Self {
        self.results.push(ObjectHypothesis::new(class_id, score));
        self
    }
    
    /// Marks the detection as tracked.
    pub fn tracked(mut self, is_tracking: bool) -> Self {
        self.is_tracking = is_tracking;
        self
    }
    
    /// Returns the hypothesis with the highest score.
    ///
    /// On ties the first maximal hypothesis wins. A NaN score never
    /// replaces a real one.
    pub fn best_hypothesis(&self) -> Option<&ObjectHypothesis> {
        let mut best: Option<&ObjectHypothesis> = None;
        for candidate in &self.results {
            let replace = match best {
                None => true,
                Some(current) => {
                    current.score < candidate.score
                        || (current.score.is_nan() && !candidate.score.is_nan())
                }
            };
            if replace {
                best = Some(candidate);
            }
        }
        best
    }
}

/// A time-stamped batch of detections sharing one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection3DArray {
    /// Stamp and source frame of every box pose in the array
    pub header: Header,
    
    /// Detections in positional order
    pub detections: Vec<Detection3D>,
}

impl Detection3DArray {
    pub fn new(header: Header, detections: Vec<Detection3D>) -> Self {
        Self { header, detections }
    }
    
    /// Wraps a bare box as an untracked detection without hypotheses.
    pub fn from_box(header: Header, bbox: BoundingBox3D) -> Self {
        let detection = Detection3D::new(header.clone(), bbox);
        Self {
            header,
            detections: vec![detection],
        }
    }
    
    /// Number of detections.
    pub fn len(&self) -> usize {
        self.detections.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

impl From<Detection3D> for Detection3DArray {
    fn from(detection: Detection3D) -> Self {
        Self {
            header: detection.header.clone(),
            detections: vec![detection],
        }
    }
}
