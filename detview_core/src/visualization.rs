//! Rerun-backed scene host.
//!
//! Implements the scene-side host traits on top of a Rerun recording:
//! - Solid boxes as `Boxes3D` under `world/bounding_box`
//! - Score labels as labelled `Points3D` under `world/score`
//! - Wireframes as `LineStrips3D` under `world/edges`
//! - Status reports as `TextLog` under `logs/status`
//!
//! Markers and lines are buffered and flushed on every update tick.
//!
//! Enable with the `visualization` feature flag.

use detview_env::{
    FrameTransformer, LineResource, Marker, MarkerKind, MarkerSurface, Pose, Rgba,
    SceneResourceFactory, StatusLevel, StatusSink,
};
use nalgebra::Point3;
use rerun::{RecordingStream, RecordingStreamBuilder};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::warn;

#[derive(Debug, Clone)]
struct LineState {
    pose: Pose,
    width: f32,
    color: Rgba,
    lines: Vec<Vec<Point3<f64>>>,
}

impl Default for LineState {
    fn default() -> Self {
        Self {
            pose: Pose::identity(),
            width: 0.0,
            color: Rgba::WHITE,
            lines: vec![Vec::new()],
        }
    }
}

#[derive(Default)]
struct RerunState {
    markers: BTreeMap<(String, usize), Marker>,
    lines: BTreeMap<usize, LineState>,
    next_line: usize,
    frame: i64,
}

/// Rerun visualizer acting as marker surface, line factory and status sink.
///
/// Clones share the same recording and buffers.
#[derive(Clone)]
pub struct RerunScene {
    rec: RecordingStream,
    frames: Option<Rc<dyn FrameTransformer>>,
    state: Rc<RefCell<RerunState>>,
}

impl RerunScene {
    /// Create a scene that spawns the Rerun viewer
    pub fn spawn(app_id: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).spawn()?;
        Self::from_stream(rec)
    }
    
    fn from_stream(rec: RecordingStream) -> Result<Self, Box<dyn std::error::Error>> {
        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;
        
        Ok(Self {
            rec,
            frames: None,
            state: Rc::new(RefCell::new(RerunState::default())),
        })
    }
    
    /// Resolves marker poses into the fixed frame before drawing them.
    ///
    /// Without frames, marker poses are drawn as given.
    pub fn with_frames(mut self, frames: impl FrameTransformer + 'static) -> Self {
        self.frames = Some(Rc::new(frames));
        self
    }
    
    fn resolve(&self, marker: &Marker) -> Option<Pose> {
        match &self.frames {
            Some(frames) => match frames.resolve(&marker.header.frame_id, &marker.pose) {
                Ok(pose) => Some(pose),
                Err(e) => {
                    warn!("Skipping marker {:?}: {}", marker.key(), e);
                    None
                }
            },
            None => Some(marker.pose),
        }
    }
    
    /// Log all buffered markers and lines
    fn flush(&self) -> Result<(), Box<dyn std::error::Error>> {
        let state = self.state.borrow();
        self.rec.set_time_sequence("frame", state.frame);
        
        let mut centers = Vec::new();
        let mut sizes = Vec::new();
        let mut quaternions = Vec::new();
        let mut box_colors = Vec::new();
        let mut label_positions = Vec::new();
        let mut labels = Vec::new();
        let mut label_colors = Vec::new();
        
        for marker in state.markers.values() {
            let Some(pose) = self.resolve(marker) else {
                continue;
            };
            let center = to_f32(&Point3::from(pose.translation.vector));
            let color = to_color(marker.color);
            
            match &marker.kind {
                MarkerKind::Cube => {
                    let q = pose.rotation.coords;
                    centers.push(center);
                    sizes.push([
                        marker.scale.x as f32,
                        marker.scale.y as f32,
                        marker.scale.z as f32,
                    ]);
                    quaternions.push(rerun::Quaternion::from_xyzw([
                        q.x as f32, q.y as f32, q.z as f32, q.w as f32,
                    ]));
                    box_colors.push(color);
                }
                MarkerKind::Text(text) => {
                    label_positions.push(center);
                    labels.push(text.clone());
                    label_colors.push(color);
                }
            }
        }
        
        if centers.is_empty() {
            self.rec.log("world/bounding_box", &rerun::Clear::flat())?;
        } else {
            self.rec.log(
                "world/bounding_box",
                &rerun::Boxes3D::from_centers_and_sizes(centers, sizes)
                    .with_quaternions(quaternions)
                    .with_colors(box_colors)
                    .with_fill_mode(rerun::FillMode::Solid),
            )?;
        }
        
        if label_positions.is_empty() {
            self.rec.log("world/score", &rerun::Clear::flat())?;
        } else {
            self.rec.log(
                "world/score",
                &rerun::Points3D::new(label_positions)
                    .with_labels(labels)
                    .with_colors(label_colors)
                    .with_radii([0.02]),
            )?;
        }
        
        let mut strips = Vec::new();
        let mut strip_colors = Vec::new();
        let mut strip_radii = Vec::new();
        for line in state.lines.values() {
            for points in line.lines.iter().filter(|points| points.len() >= 2) {
                strips.push(
                    points
                        .iter()
                        .map(|p| to_f32(&line.pose.transform_point(p)))
                        .collect::<Vec<_>>(),
                );
                strip_colors.push(to_color(line.color));
                strip_radii.push(line.width / 2.0);
            }
        }
        
        if strips.is_empty() {
            self.rec.log("world/edges", &rerun::Clear::flat())?;
        } else {
            self.rec.log(
                "world/edges",
                &rerun::LineStrips3D::new(strips)
                    .with_colors(strip_colors)
                    .with_radii(strip_radii),
            )?;
        }
        
        Ok(())
    }
}

fn to_f32(p: &Point3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

fn to_color(color: Rgba) -> rerun::Color {
    let [r, g, b, a] = color.to_rgba8();
    rerun::Color::from_unmultiplied_rgba(r, g, b, a)
}

impl MarkerSurface for RerunScene {
    fn add_marker(&mut self, marker: Marker) {
        self.state.borrow_mut().markers.insert(marker.key(), marker);
    }
    
    fn clear_markers(&mut self) {
        self.state.borrow_mut().markers.clear();
    }
    
    fn update(&mut self, _wall_dt: f32, _sim_dt: f32) {
        self.state.borrow_mut().frame += 1;
        if let Err(e) = self.flush() {
            warn!("Failed to log scene to Rerun: {:?}", e);
        }
    }
}

impl SceneResourceFactory for RerunScene {
    type Line = RerunLine;
    
    fn create_line(&mut self) -> RerunLine {
        let mut state = self.state.borrow_mut();
        let slot = state.next_line;
        state.next_line += 1;
        state.lines.insert(slot, LineState::default());
        
        RerunLine {
            slot,
            state: Rc::clone(&self.state),
        }
    }
}

impl StatusSink for RerunScene {
    fn set_status(&mut self, level: StatusLevel, category: &str, message: &str) {
        let level = match level {
            StatusLevel::Ok => rerun::components::TextLogLevel::INFO,
            StatusLevel::Warn => rerun::components::TextLogLevel::WARN,
            StatusLevel::Error => rerun::components::TextLogLevel::ERROR,
        };
        let entry = rerun::TextLog::new(format!("{}: {}", category, message)).with_level(level);
        if let Err(e) = self.rec.log("logs/status", &entry) {
            warn!("Failed to log status to Rerun: {:?}", e);
        }
    }
    
    fn delete_status(&mut self, _category: &str) {}
}

/// A wireframe slot in a [`RerunScene`]. Dropping it removes the slot.
pub struct RerunLine {
    slot: usize,
    state: Rc<RefCell<RerunState>>,
}

impl RerunLine {
    fn with_state(&self, f: impl FnOnce(&mut LineState)) {
        if let Some(line) = self.state.borrow_mut().lines.get_mut(&self.slot) {
            f(line);
        }
    }
}

impl LineResource for RerunLine {
    fn clear(&mut self) {
        self.with_state(|line| line.lines = vec![Vec::new()]);
    }
    
    fn set_pose(&mut self, pose: &Pose) {
        let pose = *pose;
        self.with_state(|line| line.pose = pose);
    }
    
    fn set_max_points_per_line(&mut self, _max: u32) {}
    
    fn set_num_lines(&mut self, num: u32) {
        self.with_state(|line| line.lines.reserve(num as usize));
    }
    
    fn set_line_width(&mut self, width: f32) {
        self.with_state(|line| line.width = width);
    }
    
    fn set_color(&mut self, color: Rgba) {
        self.with_state(|line| line.color = color);
    }
    
    fn add_point(&mut self, point: Point3<f64>) {
        self.with_state(|line| {
            if let Some(current) = line.lines.last_mut() {
                current.push(point);
            }
        });
    }
    
    fn finish_line(&mut self) {
        self.with_state(|line| line.lines.push(Vec::new()));
    }
}

impl Drop for RerunLine {
    fn drop(&mut self) {
        self.state.borrow_mut().lines.remove(&self.slot);
    }
}
