//! Deterministic sample publishers.
//!
//! Each call to [`SamplePublisher::next_message`] produces the next message
//! of a sample topic. Geometry follows a fixed counter-driven cycle; the
//! random parts (scores and labels) come from a seeded `ChaCha8Rng`, so two
//! publishers with the same seed emit identical streams.

use crate::topics::SampleTopic;
use detview_core::{BoundingBox3D, Detection3D, Detection3DArray};
use detview_env::{Header, Pose};
use nalgebra::{Translation3, UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;
use std::time::Duration;

/// Hypothesis scores cycled through by the samples
pub const SAMPLE_SCORES: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 1.0];

/// Hypothesis labels cycled through by the samples
pub const SAMPLE_LABELS: [&str; 5] = ["", "", "car", "cyclist", "tree"];

/// Rows and columns of the array grid
pub const GRID_SIZE: usize = 5;

/// Spacing between grid cells in meters
pub const GRID_SPACING: f64 = 1.5;

/// Produces sample messages for one topic.
pub struct SamplePublisher {
    topic: SampleTopic,
    frame_id: String,
    rng: ChaCha8Rng,
    counter: u64,
    published: u64,
}

impl SamplePublisher {
    /// Creates a publisher stamping messages in `frame_id`.
    pub fn new(topic: SampleTopic, seed: u64, frame_id: impl Into<String>) -> Self {
        Self {
            topic,
            frame_id: frame_id.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            counter: 0,
            published: 0,
        }
    }
    
    /// Number of messages published so far.
    pub fn published(&self) -> u64 {
        self.published
    }
    
    /// Stamp of the next message.
    pub fn stamp(&self) -> Duration {
        Duration::from_secs_f64(self.published as f64 * self.topic.period_secs())
    }
    
    /// Produces the next message of the topic as an array.
    pub fn next_message(&mut self) -> Detection3DArray {
        let header = Header::new(self.frame_id.clone(), self.stamp());
        let message = match self.topic {
            SampleTopic::BoundingBox => {
                self.counter %= 10;
                Detection3DArray::from_box(header, self.single_box(-GRID_SPACING))
            }
            SampleTopic::Detection => {
                self.counter %= 10;
                let (score, label) = self.random_hypothesis();
                Detection3D::new(header, self.single_box(GRID_SPACING))
                    .with_result(label, score)
                    .into()
            }
            SampleTopic::Array => self.grid(header),
        };
        
        self.counter += 1;
        self.published += 1;
        message
    }
    
    fn random_hypothesis(&mut self) -> (f64, &'static str) {
        let score = SAMPLE_SCORES[self.rng.gen_range(0..SAMPLE_SCORES.len())];
        let label = SAMPLE_LABELS[self.rng.gen_range(0..SAMPLE_LABELS.len())];
        (score, label)
    }
    
    fn yaw(&self) -> UnitQuaternion<f64> {
        let angle = (self.counter % 100) as f64 * 2.0 * PI / 100.0;
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle)
    }
    
    fn single_box(&self, x: f64) -> BoundingBox3D {
        let c = self.counter;
        let size = Vector3::new(
            (c % 10 + 1) as f64 * 0.1,
            ((c + 1) % 5 + 1) as f64 * 0.1,
            ((c + 2) % 10 + 1) as f64 * 0.1,
        );
        BoundingBox3D::new(Pose::from_parts(Translation3::new(x, 0.0, 0.0), self.yaw()), size)
    }
    
    fn grid(&mut self, header: Header) -> Detection3DArray {
        let c = self.counter;
        let rotation = self.yaw();
        let mut detections = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        
        for i in 0..GRID_SIZE {
            for j in 0..GRID_SIZE {
                let row = i as u64 + 1;
                let center = Translation3::new(GRID_SPACING * row as f64, GRID_SPACING * (j + 1) as f64, 0.0);
                let size = Vector3::new(
                    (c % 10 + 1) as f64 * 0.1,
                    ((c + 1) % (5 * row) + 1) as f64 * 0.1,
                    ((c + 2) % (10 * row) + 1) as f64 * 0.1,
                );
                
                let (score, label) = if i == GRID_SIZE - 1 {
                    self.random_hypothesis()
                } else {
                    (SAMPLE_SCORES[i], SAMPLE_LABELS[j])
                };
                
                let bbox = BoundingBox3D::new(Pose::from_parts(center, rotation), size);
                detections.push(Detection3D::new(header.clone(), bbox).with_result(label, score));
            }
        }
        
        Detection3DArray::new(header, detections)
    }
}
