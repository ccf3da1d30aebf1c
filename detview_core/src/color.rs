//! Color policy: detection semantics to RGBA.
//!
//! Pure and stateless. Every color returned here is fully opaque; the
//! display applies the configured alpha afterwards.

use crate::messages::Detection3D;
use detview_env::Rgba;

/// Label-less detection coming from a tracker
pub const TRACKING_RGB: [u8; 3] = [22, 255, 80];

/// Label-less detection without tracking
pub const DETECTED_RGB: [u8; 3] = [255, 22, 80];

/// Labelled detection outside the known vocabulary
pub const UNKNOWN_RGB: [u8; 3] = [190, 190, 190];

/// The small class vocabulary with a dedicated hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Car,
    Person,
    Cyclist,
    Motorcycle,
    Other,
}

impl ObjectClass {
    /// Classifies a label, ignoring ASCII case.
    pub fn from_label(label: &str) -> Self {
        const VOCABULARY: [(&str, ObjectClass); 4] = [
            ("car", ObjectClass::Car),
            ("person", ObjectClass::Person),
            ("cyclist", ObjectClass::Cyclist),
            ("motorcycle", ObjectClass::Motorcycle),
        ];
        
        VOCABULARY
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map_or(ObjectClass::Other, |(_, class)| *class)
    }
    
    /// Returns the class hue.
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            ObjectClass::Car => [255, 165, 0],        // orange
            ObjectClass::Person => [0, 0, 255],       // blue
            ObjectClass::Cyclist => [255, 255, 0],    // yellow
            ObjectClass::Motorcycle => [230, 230, 250], // lavender
            ObjectClass::Other => UNKNOWN_RGB,
        }
    }
}

/// Maps a tracking flag and an optional class label to an opaque color.
///
/// An empty label is treated like a missing one.
pub fn color_for(is_tracking: bool, label: Option<&str>) -> Rgba {
    let rgb = match label {
        Some(label) if !label.is_empty() => ObjectClass::from_label(label).rgb(),
        _ if is_tracking => TRACKING_RGB,
        _ => DETECTED_RGB,
    };
    Rgba::from_rgb8(rgb)
}

/// Colors a detection by its best-scoring hypothesis.
pub fn detection_color(detection: &Detection3D) -> Rgba {
    let label = detection
        .best_hypothesis()
        .map(|hypothesis| hypothesis.class_id.as_str());
    color_for(detection.is_tracking, label)
}
