//! Common value types shared between the display engine and its host.

use nalgebra::{Isometry3, Vector3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A rigid pose: position plus orientation.
///
/// Positions are in meters, orientation is a unit quaternion.
pub type Pose = Isometry3<f64>;

/// Message header: acquisition time plus the coordinate frame the
/// message's poses are expressed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Time since the source clock's epoch
    pub stamp: Duration,
    
    /// Coordinate frame id (e.g. "map", "base_link")
    pub frame_id: String,
}

impl Header {
    /// Creates a header for the given frame.
    pub fn new(frame_id: impl Into<String>, stamp: Duration) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

/// Straight RGBA color with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    
    /// Creates an opaque color from 8-bit channels.
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0] as f32 / 255.0,
            g: rgb[1] as f32 / 255.0,
            b: rgb[2] as f32 / 255.0,
            a: 1.0,
        }
    }
    
    /// Returns the same color with alpha replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
    
    /// Quantizes back to 8-bit channels (alpha included).
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// What a [`Marker`] draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Solid box, `scale` is the full edge length along each local axis
    Cube,
    
    /// View-facing text, `scale.z` is the text height
    Text(String),
}

/// A primitive handed to the host's [`MarkerSurface`](crate::MarkerSurface).
///
/// Markers are keyed by `(namespace, id)`: submitting a marker with a key
/// that is already present replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Grouping namespace (e.g. "bounding_box")
    pub namespace: String,
    
    /// Id within the namespace
    pub id: usize,
    
    /// Frame and stamp the pose is expressed in
    pub header: Header,
    
    /// Primitive type
    pub kind: MarkerKind,
    
    /// Placement of the primitive's center
    pub pose: Pose,
    
    /// Size along the local x/y/z axes
    pub scale: Vector3<f64>,
    
    /// Fill color
    pub color: Rgba,
}

impl Marker {
    /// Returns the replace-key of this marker.
    pub fn key(&self) -> (String, usize) {
        (self.namespace.clone(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_rgba_from_rgb8() {
        let color = Rgba::from_rgb8([255, 0, 51]);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.b - 0.2).abs() < 1e-6);
        assert_eq!(color.a, 1.0);
    }
    
    #[test]
    fn test_rgba_quantize_roundtrip() {
        let color = Rgba::from_rgb8([22, 255, 80]).with_alpha(0.5);
        assert_eq!(color.to_rgba8(), [22, 255, 80, 128]);
    }
}
