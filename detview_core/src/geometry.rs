//! Geometry builder: one detection to a solid box or a 12-edge wireframe.
//!
//! Corner labelling used throughout, in box-local coordinates with
//! half-extents `(x, y, z) = (w/2, d/2, h/2)`:
//!
//! ```text
//!        B-------A        top    (z = +h/2)
//!       /|      /|
//!      C-------D |
//!      | F-----|-E        bottom (z = -h/2)
//!      |/      |/
//!      G-------H
//!
//! A = (+x, +y)  B = (-x, +y)  C = (-x, -y)  D = (+x, -y)
//! ```
//!
//! E..H sit directly below A..D.

use crate::color::detection_color;
use crate::error::TransformError;
use crate::messages::Detection3D;
use detview_env::{FrameTransformer, Header, LineResource, Marker, MarkerKind, Pose, Rgba};
use nalgebra::{Point3, Translation3, UnitQuaternion, Vector3};

/// Namespace of solid box markers
pub const BOX_NAMESPACE: &str = "bounding_box";

/// Namespace of score text markers
pub const SCORE_NAMESPACE: &str = "score";

/// Number of edges of a box wireframe
pub const EDGE_COUNT: usize = 12;

/// Height of score text, in meters
pub const SCORE_TEXT_HEIGHT: f64 = 0.3;

/// Gap between the box top and the score text, in meters
pub const SCORE_MARGIN: f64 = 0.2;

/// A 2-point line in box-local coordinates.
pub type Segment = [Point3<f64>; 2];

/// Builds the solid box marker for one detection.
///
/// The pose is copied from the detection as-is; it stays in the frame named
/// by `header` and the marker surface is responsible for placing it.
pub fn build_box(detection: &Detection3D, header: &Header, id: usize, alpha: f32) -> Marker {
    Marker {
        namespace: BOX_NAMESPACE.to_string(),
        id,
        header: header.clone(),
        kind: MarkerKind::Cube,
        pose: detection.bbox.center,
        scale: detection.bbox.size,
        color: detection_color(detection).with_alpha(alpha),
    }
}

/// Returns the eight corners `[A, B, C, D, E, F, G, H]` of a box of `size`.
///
/// Degenerate sizes are not rejected: a zero component collapses opposite
/// corners onto each other, a negative one mirrors them.
pub fn box_corners(size: &Vector3<f64>) -> [Point3<f64>; 8] {
    let (x, y, z) = (size.x / 2.0, size.y / 2.0, size.z / 2.0);
    [
        Point3::new(x, y, z),
        Point3::new(-x, y, z),
        Point3::new(-x, -y, z),
        Point3::new(x, -y, z),
        Point3::new(x, y, -z),
        Point3::new(-x, y, -z),
        Point3::new(-x, -y, -z),
        Point3::new(x, -y, -z),
    ]
}

/// Returns the 12 box edges: top face, bottom face, then the verticals.
pub fn wireframe_segments(size: &Vector3<f64>) -> [Segment; EDGE_COUNT] {
    let [a, b, c, d, e, f, g, h] = box_corners(size);
    [
        [a, b],
        [b, c],
        [c, d],
        [d, a],
        [e, f],
        [f, g],
        [g, h],
        [h, e],
        [a, e],
        [b, f],
        [c, g],
        [d, h],
    ]
}

/// A resolved box wireframe, ready to be written into a line resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe {
    /// Placement of the box center in the fixed frame
    pub pose: Pose,
    
    /// Edges in box-local coordinates
    pub segments: [Segment; EDGE_COUNT],
    
    /// Line color with alpha applied
    pub color: Rgba,
    
    /// Line width in meters
    pub line_width: f32,
}

impl Wireframe {
    /// Writes placement, style and the 12 segments into `line`.
    ///
    /// The line is expected to be empty. The last segment is left open,
    /// since the resource reserves exactly [`EDGE_COUNT`] lines.
    pub fn write_to<L: LineResource + ?Sized>(&self, line: &mut L) {
        line.set_pose(&self.pose);
        line.set_max_points_per_line(2);
        line.set_num_lines(EDGE_COUNT as u32);
        line.set_line_width(self.line_width);
        line.set_color(self.color);
        
        for (i, [from, to]) in self.segments.iter().enumerate() {
            if i > 0 {
                line.finish_line();
            }
            line.add_point(*from);
            line.add_point(*to);
        }
    }
}

/// Builds the wireframe for one detection, resolving its center pose from
/// `header.frame_id` into the transform service's fixed frame.
///
/// # Returns
/// * `Ok(wireframe)` - Pose resolved, 12 segments built
/// * `Err(TransformError)` - The frame could not be resolved; no geometry
pub fn build_edges(
    detection: &Detection3D,
    header: &Header,
    frames: &dyn FrameTransformer,
    line_width: f32,
    alpha: f32,
) -> Result<Wireframe, TransformError> {
    let pose = frames
        .resolve(&header.frame_id, &detection.bbox.center)
        .map_err(|reason| TransformError {
            source_frame: header.frame_id.clone(),
            target_frame: frames.fixed_frame().to_string(),
            reason,
        })?;
    
    Ok(Wireframe {
        pose,
        segments: wireframe_segments(&detection.bbox.size),
        color: detection_color(detection).with_alpha(alpha),
        line_width,
    })
}

/// Builds the score label for one detection, or `None` if it has no
/// hypotheses.
///
/// `center` is the box center in whatever frame `header` names. The label
/// floats above the box top along that frame's z axis.
pub fn build_score_label(
    detection: &Detection3D,
    header: &Header,
    center: &Pose,
    id: usize,
    alpha: f32,
) -> Option<Marker> {
    let best = detection.best_hypothesis()?;
    let lift = detection.bbox.size.z.abs() / 2.0 + SCORE_MARGIN;
    let position = center.translation.vector + Vector3::new(0.0, 0.0, lift);
    
    Some(Marker {
        namespace: SCORE_NAMESPACE.to_string(),
        id,
        header: header.clone(),
        kind: MarkerKind::Text(format!("{:.2}", best.score)),
        pose: Pose::from_parts(Translation3::from(position), UnitQuaternion::identity()),
        scale: Vector3::new(0.0, 0.0, SCORE_TEXT_HEIGHT),
        color: Rgba::WHITE.with_alpha(alpha),
    })
}
