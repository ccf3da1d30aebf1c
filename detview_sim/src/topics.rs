//! Sample topics the simulator can replay.

/// Topic identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTopic {
    /// A bare box, wrapped as a one-element array
    BoundingBox,
    
    /// A single detection with one random hypothesis
    Detection,
    
    /// A 5x5 grid of detections
    Array,
}

impl SampleTopic {
    /// Returns all topics.
    pub fn all() -> Vec<SampleTopic> {
        vec![
            SampleTopic::BoundingBox,
            SampleTopic::Detection,
            SampleTopic::Array,
        ]
    }
    
    /// Returns the topic name.
    pub fn name(&self) -> &'static str {
        match self {
            SampleTopic::BoundingBox => "bounding_box_3d",
            SampleTopic::Detection => "detection3_d",
            SampleTopic::Array => "detection3_d_array",
        }
    }
    
    /// Returns a description of the topic.
    pub fn description(&self) -> &'static str {
        match self {
            SampleTopic::BoundingBox => "Single rotating box at (-1.5, 0) with cycling size",
            SampleTopic::Detection => "Single rotating detection at (1.5, 0) with a random score and label",
            SampleTopic::Array => "5x5 grid of rotating detections, last row randomized",
        }
    }
    
    /// Publishing period in seconds.
    pub fn period_secs(&self) -> f64 {
        match self {
            SampleTopic::Array => 0.5,
            _ => 0.1,
        }
    }
}

impl std::fmt::Display for SampleTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SampleTopic {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bounding_box" | "bounding_box_3d" | "box" => Ok(SampleTopic::BoundingBox),
            "detection" | "detection3_d" => Ok(SampleTopic::Detection),
            "array" | "detection3_d_array" => Ok(SampleTopic::Array),
            _ => Err(format!("Unknown topic: {}", s)),
        }
    }
}
