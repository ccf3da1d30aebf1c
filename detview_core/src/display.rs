//! The Scene Synchronizer: per-message lifecycle of a detection display.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized --initialize()--> Initialized --on_message()--> Rendering
//!                                      ^                          |  ^
//!                                      |                          |  | on_message()
//!                                      +--------reset()-----------+  | on_config_change()
//!                                                                 +--+
//! ```
//!
//! Everything runs on the host's single UI thread. A render pass is applied
//! completely (or aborted on a transform failure) before the next message or
//! config change is processed.

use crate::config::{ConfigChange, DisplayConfig, ALPHA_BOUNDS, LINE_WIDTH_BOUNDS};
use crate::edge_pool::EdgePool;
use crate::error::{ConfigError, TransformError};
use crate::geometry::{build_box, build_edges, build_score_label};
use crate::messages::Detection3DArray;
use detview_env::{
    DisplayProperty, FrameTransformer, Header, LineResource, MarkerSurface, PropertyPanel,
    RecordingScene, SceneResourceFactory, StatusLevel, StatusSink,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status category used for frame resolution failures
pub const TRANSFORM_STATUS: &str = "Transform";

/// The host collaborators a display renders through.
pub struct DisplayHost<F> {
    /// Frame resolution into the fixed frame
    pub frames: Box<dyn FrameTransformer>,
    
    /// Solid box and text markers
    pub markers: Box<dyn MarkerSurface>,
    
    /// User-visible status
    pub status: Box<dyn StatusSink>,
    
    /// Property widgets
    pub properties: Box<dyn PropertyPanel>,
    
    /// Line resource allocation on the display's scene node
    pub scene: F,
}

impl DisplayHost<RecordingScene> {
    /// Lets one recording scene play every scene-side role.
    pub fn recording(frames: impl FrameTransformer + 'static, scene: &RecordingScene) -> Self {
        Self {
            frames: Box::new(frames),
            markers: Box::new(scene.clone()),
            status: Box::new(scene.clone()),
            properties: Box::new(scene.clone()),
            scene: scene.clone(),
        }
    }
}

/// Lifecycle state of a display instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Constructed, `initialize()` not called yet
    Uninitialized,
    
    /// Defaults established, nothing rendered since the last reset
    Initialized,
    
    /// At least one message rendered
    Rendering,
}

/// A 3D detection display.
///
/// Renders each incoming [`Detection3DArray`] either as solid boxes or as
/// wireframes, keeps the latest message for re-rendering on config changes,
/// and owns the pool of wireframe line resources.
pub struct DetectionDisplay<F: SceneResourceFactory> {
    host: DisplayHost<F>,
    config: DisplayConfig,
    edges: EdgePool<F::Line>,
    latest: Option<Arc<Detection3DArray>>,
    blob: Value,
    state: DisplayState,
}

impl<F: SceneResourceFactory> DetectionDisplay<F> {
    /// Creates an uninitialized display.
    pub fn new(host: DisplayHost<F>) -> Self {
        Self {
            host,
            config: DisplayConfig::default(),
            edges: EdgePool::new(),
            latest: None,
            blob: Value::Object(Default::default()),
            state: DisplayState::Uninitialized,
        }
    }
    
    /// Establishes default settings and property bounds.
    pub fn initialize(&mut self) {
        let properties = &mut self.host.properties;
        properties.set_bounds(DisplayProperty::LineWidth, LINE_WIDTH_BOUNDS.0, LINE_WIDTH_BOUNDS.1);
        properties.set_visible(DisplayProperty::LineWidth, false);
        properties.set_bounds(DisplayProperty::Alpha, ALPHA_BOUNDS.0, ALPHA_BOUNDS.1);
        
        self.config = DisplayConfig::default();
        self.state = DisplayState::Initialized;
        info!("Detection display initialized (fixed frame '{}')", self.host.frames.fixed_frame());
    }
    
    pub fn state(&self) -> DisplayState {
        self.state
    }
    
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }
    
    /// Wireframe resources, index-aligned with the last edge pass.
    pub fn edge_pool(&self) -> &EdgePool<F::Line> {
        &self.edges
    }
    
    /// The last message received, kept for re-rendering.
    pub fn latest_message(&self) -> Option<&Detection3DArray> {
        self.latest.as_deref()
    }
    
    pub fn host(&self) -> &DisplayHost<F> {
        &self.host
    }
    
    pub fn host_mut(&mut self) -> &mut DisplayHost<F> {
        &mut self.host
    }
    
    /// Loads settings from an opaque config blob.
    ///
    /// The blob is validated as a whole first. Each known key present is
    /// then written into its panel widget and applied as a property change,
    /// so the panel and the config agree; a retained message is re-rendered.
    /// The whole blob is kept and forwarded to the marker surface.
    pub fn load(&mut self, blob: &Value) -> Result<(), ConfigError> {
        let mut loaded = self.config;
        loaded.merge_blob(blob)?;
        self.blob = blob.clone();
        self.host.markers.load(blob);
        
        for field in DisplayProperty::all() {
            if blob.get(field.name()).is_some() {
                loaded.change_for(field).write(self.host.properties.as_mut());
                self.on_property_changed(field);
            }
        }
        debug!("Loaded display config: {:?}", self.config);
        Ok(())
    }
    
    /// Returns the config blob with the current settings written in.
    pub fn save(&self) -> Value {
        let mut blob = self.blob.clone();
        self.config.write_blob(&mut blob);
        blob
    }
    
    /// Handles a new message: retains it and renders it in the current mode.
    pub fn on_message(&mut self, message: impl Into<Arc<Detection3DArray>>) {
        if self.state == DisplayState::Uninitialized {
            warn!("Dropping detection message: display not initialized");
            return;
        }
        
        let message = message.into();
        self.latest = Some(Arc::clone(&message));
        self.render(&message);
    }
    
    /// Submits one solid box per detection, tagged `("bounding_box", index)`.
    ///
    /// Earlier submissions are not cleared here; the marker surface replaces
    /// markers with the same key. Wireframes from an earlier edge pass are
    /// released.
    pub fn render_boxes(&mut self, array: &Detection3DArray) {
        let config = self.config;
        let released = self.edges.clear().released;
        
        for (idx, detection) in array.detections.iter().enumerate() {
            self.host
                .markers
                .add_marker(build_box(detection, &array.header, idx, config.alpha));
            
            if config.show_score {
                let center = detection.bbox.center;
                if let Some(label) =
                    build_score_label(detection, &array.header, &center, idx, config.alpha)
                {
                    self.host.markers.add_marker(label);
                }
            }
        }
        
        debug!(
            "Rendered {} boxes in frame '{}' (released {} wireframes)",
            array.len(),
            array.header.frame_id,
            released
        );
    }
    
    /// Rebuilds the wireframe of every detection in the fixed frame.
    ///
    /// Clears all markers, resizes the pool to exactly one entry per
    /// detection, then fills entries in order. The first pose that cannot be
    /// resolved is reported as an error status and ends the pass: the
    /// failing entry is left empty and later entries keep their previous
    /// content.
    pub fn render_edges(&mut self, array: &Detection3DArray) -> Result<(), TransformError> {
        let config = self.config;
        self.host.markers.clear_markers();
        
        let resize = self.edges.resize(array.len(), &mut self.host.scene);
        let fixed_header = Header::new(self.host.frames.fixed_frame(), array.header.stamp);
        
        for (idx, detection) in array.detections.iter().enumerate() {
            let Some(line) = self.edges.get_mut(idx) else {
                break;
            };
            line.clear();
            
            let wireframe = match build_edges(
                detection,
                &array.header,
                self.host.frames.as_ref(),
                config.line_width,
                config.alpha,
            ) {
                Ok(wireframe) => wireframe,
                Err(err) => {
                    warn!("{} (detection {} of {})", err, idx, array.len());
                    self.host
                        .status
                        .set_status(StatusLevel::Error, TRANSFORM_STATUS, &err.to_string());
                    return Err(err);
                }
            };
            wireframe.write_to(line);
            
            if config.show_score {
                if let Some(label) =
                    build_score_label(detection, &fixed_header, &wireframe.pose, idx, config.alpha)
                {
                    self.host.markers.add_marker(label);
                }
            }
        }
        
        self.host.status.delete_status(TRANSFORM_STATUS);
        debug!(
            "Rendered {} wireframes into '{}' (+{} / -{} line resources)",
            array.len(),
            fixed_header.frame_id,
            resize.allocated,
            resize.released
        );
        Ok(())
    }
    
    /// Forwards a frame tick to the marker surface.
    pub fn on_update_tick(&mut self, wall_dt: f32, sim_dt: f32) {
        self.host.markers.update(wall_dt, sim_dt);
    }
    
    /// Drops all rendered state and the retained message. Settings are kept.
    pub fn reset(&mut self) {
        self.host.markers.clear_markers();
        self.host.status.delete_status(TRANSFORM_STATUS);
        let released = self.edges.clear().released;
        self.latest = None;
        
        if self.state != DisplayState::Uninitialized {
            self.state = DisplayState::Initialized;
        }
        info!("Detection display reset ({} wireframes released)", released);
    }
    
    /// Applies a config change and immediately re-renders the retained
    /// message, if any.
    pub fn on_config_change(&mut self, change: ConfigChange) {
        self.config.apply(change);
        
        match change {
            ConfigChange::EdgeOnly(edge_only) => {
                self.host
                    .properties
                    .set_visible(DisplayProperty::LineWidth, edge_only);
            }
            // Box passes never remove labels, so drop them here
            ConfigChange::ShowScore(false) => self.host.markers.clear_markers(),
            _ => {}
        }
        
        debug!("{} changed: {:?}", change.field(), self.config);
        self.rerender();
    }
    
    /// Handles a change notification from the property panel by reading the
    /// field's current value.
    pub fn on_property_changed(&mut self, field: DisplayProperty) {
        let change = ConfigChange::read(field, self.host.properties.as_ref());
        self.on_config_change(change);
    }
    
    fn rerender(&mut self) {
        if let Some(latest) = self.latest.clone() {
            self.render(&latest);
        }
    }
    
    fn render(&mut self, array: &Detection3DArray) {
        if self.config.edge_only {
            // Already reported through the status sink
            let _ = self.render_edges(array);
        } else {
            self.render_boxes(array);
        }
        self.state = DisplayState::Rendering;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{color_for, DETECTED_RGB};
    use crate::geometry::{BOX_NAMESPACE, SCORE_NAMESPACE};
    use crate::messages::{BoundingBox3D, Detection3D};
    use detview_env::{MarkerKind, Pose, RecordedLine, Rgba, StaticFrameTree};
    use nalgebra::Vector3;
    use serde_json::json;
    
    fn map_tree() -> StaticFrameTree {
        StaticFrameTree::new("map")
    }
    
    fn setup(frames: StaticFrameTree) -> (DetectionDisplay<RecordingScene>, RecordingScene) {
        let scene = RecordingScene::new();
        let mut display = DetectionDisplay::new(DisplayHost::recording(frames, &scene));
        display.initialize();
        (display, scene)
    }
    
    fn sample_array(labels: &[&str]) -> Detection3DArray {
        let header = Header::new("map", Default::default());
        let detections = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let bbox = BoundingBox3D::new(
                    Pose::translation(1.5 * (i + 1) as f64, 0.0, 0.0),
                    Vector3::new(1.0, 2.0, 3.0),
                );
                let detection = Detection3D::new(header.clone(), bbox);
                if label.is_empty() {
                    detection
                } else {
                    detection.with_result(*label, 0.5 + i as f64 / 10.0)
                }
            })
            .collect();
        Detection3DArray::new(header, detections)
    }
    
    fn line(display: &DetectionDisplay<RecordingScene>, idx: usize) -> &RecordedLine {
        display.edge_pool().get(idx).unwrap()
    }
    
    #[test]
    fn test_initialize_sets_defaults_and_panel() {
        let (display, scene) = setup(map_tree());
        
        assert_eq!(display.state(), DisplayState::Initialized);
        assert_eq!(*display.config(), DisplayConfig::default());
        
        let width = scene.property(DisplayProperty::LineWidth).unwrap();
        assert!(!width.visible);
        assert_eq!((width.min, width.max), (Some(0.01), Some(0.1)));
        
        let alpha = scene.property(DisplayProperty::Alpha).unwrap();
        assert_eq!((alpha.min, alpha.max), (Some(0.1), Some(1.0)));
    }
    
    #[test]
    fn test_box_mode_submits_one_box_per_detection() {
        let (mut display, scene) = setup(map_tree());
        display.on_config_change(ConfigChange::Alpha(0.6));
        
        display.on_message(sample_array(&["car", "Person", ""]));
        
        let boxes = scene.markers_in(BOX_NAMESPACE);
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes.iter().map(|m| m.id).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(boxes[0].color, color_for(false, Some("car")).with_alpha(0.6));
        assert_eq!(boxes[1].color, color_for(false, Some("person")).with_alpha(0.6));
        assert_eq!(boxes[2].color, Rgba::from_rgb8(DETECTED_RGB).with_alpha(0.6));
        assert!(boxes.iter().all(|m| m.kind == MarkerKind::Cube));
        assert_eq!(scene.submission_count(), 3);
        assert_eq!(display.state(), DisplayState::Rendering);
        assert!(display.edge_pool().is_empty());
    }
    
    #[test]
    fn test_box_mode_accumulates_by_key() {
        let (mut display, scene) = setup(map_tree());
        display.on_message(sample_array(&["car", "car", "car"]));
        display.on_message(sample_array(&["car"]));
        
        // Replace-by-key belongs to the surface: id 0 replaced, 1 and 2 kept
        assert_eq!(scene.submission_count(), 4);
        assert_eq!(scene.marker_count(), 3);
        assert_eq!(scene.clear_count(), 0);
    }
    
    #[test]
    fn test_edge_mode_populates_pool() {
        let (mut display, scene) = setup(map_tree());
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_config_change(ConfigChange::LineWidth(0.05));
        
        display.on_message(sample_array(&["car", "cyclist"]));
        
        assert_eq!(display.edge_pool().len(), 2);
        for idx in 0..2 {
            let entry = line(&display, idx);
            assert_eq!(entry.lines().len(), 12);
            assert_eq!(entry.num_lines(), 12);
            assert_eq!(entry.max_points_per_line(), 2);
            assert_eq!(entry.line_width(), 0.05);
        }
        assert_eq!(*line(&display, 1).pose(), Pose::translation(3.0, 0.0, 0.0));
        assert_eq!(scene.error_count(), 0);
        assert_eq!(scene.marker_count(), 0);
    }
    
    #[test]
    fn test_edge_mode_halts_at_first_transform_failure() {
        let (mut display, scene) = setup(map_tree());
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_message(sample_array(&["car", "person"]));
        assert_eq!(line(&display, 1).clear_count(), 1);
        
        // The message frame is no longer reachable from the fixed frame
        display.host_mut().frames = Box::new(StaticFrameTree::new("odom"));
        display.on_message(sample_array(&["car", "person"]));
        
        let status = scene.status(TRANSFORM_STATUS).unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.message.contains("'map'"));
        assert!(status.message.contains("'odom'"));
        assert_eq!(scene.error_count(), 1);
        
        assert_eq!(display.edge_pool().len(), 2);
        assert!(line(&display, 0).is_empty());
        // Entry 1 was never touched by the aborted pass
        assert_eq!(line(&display, 1).clear_count(), 1);
        assert_eq!(line(&display, 1).lines().len(), 12);
        
        // The message is retained for the next attempt
        assert_eq!(display.latest_message().unwrap().len(), 2);
    }
    
    #[test]
    fn test_failure_on_first_pass_leaves_entries_empty() {
        let (mut display, scene) = setup(StaticFrameTree::new("odom"));
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_message(sample_array(&["car", "person"]));
        
        assert_eq!(scene.error_count(), 1);
        assert_eq!(display.edge_pool().len(), 2);
        assert!(line(&display, 0).is_empty());
        assert!(line(&display, 1).is_empty());
        assert_eq!(line(&display, 1).clear_count(), 0);
    }
    
    #[test]
    fn test_successful_pass_clears_transform_status() {
        let (mut display, scene) = setup(StaticFrameTree::new("odom"));
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_message(sample_array(&["car"]));
        assert!(scene.status(TRANSFORM_STATUS).is_some());
        
        let mut tree = StaticFrameTree::new("odom");
        tree.add_frame("map", "odom", Pose::identity());
        display.host_mut().frames = Box::new(tree);
        display.on_update_tick(0.1, 0.1);
        display.on_message(sample_array(&["car"]));
        
        assert!(scene.status(TRANSFORM_STATUS).is_none());
        assert_eq!(line(&display, 0).lines().len(), 12);
    }
    
    #[test]
    fn test_edge_pool_tracks_detection_count() {
        let (mut display, scene) = setup(map_tree());
        display.on_config_change(ConfigChange::EdgeOnly(true));
        
        display.on_message(sample_array(&["car"; 4]));
        assert_eq!(scene.lines_created(), 4);
        
        display.on_message(sample_array(&["car"; 2]));
        assert_eq!(display.edge_pool().len(), 2);
        assert_eq!(scene.lines_released(), 2);
        
        display.on_message(sample_array(&["car"; 3]));
        assert_eq!(scene.lines_created(), 5);
        assert_eq!(scene.live_lines(), 3);
        
        display.on_message(sample_array(&[]));
        assert!(display.edge_pool().is_empty());
        assert_eq!(scene.live_lines(), 0);
        assert_eq!(scene.marker_count(), 0);
    }
    
    #[test]
    fn test_toggle_edge_only_rerenders_immediately() {
        let (mut display, scene) = setup(map_tree());
        display.on_message(sample_array(&["car"]));
        assert_eq!(scene.markers_in(BOX_NAMESPACE).len(), 1);
        
        display.on_config_change(ConfigChange::EdgeOnly(true));
        
        assert!(scene.property(DisplayProperty::LineWidth).unwrap().visible);
        assert_eq!(display.edge_pool().len(), 1);
        assert_eq!(line(&display, 0).lines().len(), 12);
        assert_eq!(scene.marker_count(), 0);
        
        display.on_config_change(ConfigChange::EdgeOnly(false));
        
        assert!(!scene.property(DisplayProperty::LineWidth).unwrap().visible);
        assert!(display.edge_pool().is_empty());
        assert_eq!(scene.live_lines(), 0);
        assert_eq!(scene.markers_in(BOX_NAMESPACE).len(), 1);
    }
    
    #[test]
    fn test_alpha_change_rerenders() {
        let (mut display, scene) = setup(map_tree());
        display.on_message(sample_array(&["car"]));
        
        display.on_config_change(ConfigChange::Alpha(0.3));
        
        assert_eq!(scene.submission_count(), 2);
        assert_eq!(scene.markers_in(BOX_NAMESPACE)[0].color.a, 0.3);
    }
    
    #[test]
    fn test_line_width_change_rerenders_retained_message() {
        let (mut display, scene) = setup(map_tree());
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_message(sample_array(&["car", "person"]));
        let created = scene.lines_created();
        
        display.on_config_change(ConfigChange::LineWidth(0.03));
        
        assert_eq!(line(&display, 0).line_width(), 0.03);
        assert_eq!(line(&display, 1).line_width(), 0.03);
        assert_eq!(line(&display, 0).lines().len(), 12);
        // Same pool entries, refilled in place
        assert_eq!(scene.lines_created(), created);
        assert_eq!(line(&display, 0).clear_count(), 2);
    }
    
    #[test]
    fn test_config_change_without_message_is_noop() {
        let (mut display, scene) = setup(map_tree());
        
        display.on_config_change(ConfigChange::LineWidth(0.02));
        display.on_config_change(ConfigChange::EdgeOnly(true));
        
        assert_eq!(display.config().line_width, 0.02);
        assert_eq!(scene.submission_count(), 0);
        assert_eq!(scene.lines_created(), 0);
        assert_eq!(display.state(), DisplayState::Initialized);
    }
    
    #[test]
    fn test_property_change_reads_panel() {
        let (mut display, scene) = setup(map_tree());
        display.on_message(sample_array(&["car"]));
        
        scene.set_float(DisplayProperty::Alpha, 5.0);
        display.on_property_changed(DisplayProperty::Alpha);
        
        // The panel enforces its bounds before the display sees the value
        assert_eq!(display.config().alpha, 1.0);
        
        scene.set_bool(DisplayProperty::OnlyEdge, true);
        display.on_property_changed(DisplayProperty::OnlyEdge);
        assert!(display.config().edge_only);
        assert_eq!(display.edge_pool().len(), 1);
    }
    
    #[test]
    fn test_score_labels_in_box_mode() {
        let (mut display, scene) = setup(map_tree());
        display.on_message(sample_array(&["car", ""]));
        assert!(scene.markers_in(SCORE_NAMESPACE).is_empty());
        
        display.on_config_change(ConfigChange::ShowScore(true));
        
        // Only detections with a hypothesis get a label
        let labels = scene.markers_in(SCORE_NAMESPACE);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].kind, MarkerKind::Text("0.50".to_string()));
        assert_eq!(labels[0].header.frame_id, "map");
        
        display.on_config_change(ConfigChange::ShowScore(false));
        assert!(scene.markers_in(SCORE_NAMESPACE).is_empty());
        assert_eq!(scene.markers_in(BOX_NAMESPACE).len(), 2);
    }
    
    #[test]
    fn test_score_labels_in_edge_mode_use_fixed_frame() {
        let mut tree = StaticFrameTree::new("odom");
        tree.add_frame("map", "odom", Pose::translation(0.0, 0.0, 1.0));
        let (mut display, scene) = setup(tree);
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_config_change(ConfigChange::ShowScore(true));
        
        display.on_message(sample_array(&["car"]));
        
        let labels = scene.markers_in(SCORE_NAMESPACE);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].header.frame_id, "odom");
        assert!((labels[0].pose.translation.vector.z - (1.0 + 1.5 + 0.2)).abs() < 1e-9);
        assert!(scene.markers_in(BOX_NAMESPACE).is_empty());
    }
    
    #[test]
    fn test_reset_is_idempotent() {
        let (mut display, scene) = setup(map_tree());
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_message(sample_array(&["car", "car"]));
        
        display.reset();
        display.reset();
        
        assert!(display.edge_pool().is_empty());
        assert_eq!(scene.live_lines(), 0);
        assert_eq!(scene.marker_count(), 0);
        assert!(display.latest_message().is_none());
        assert_eq!(display.state(), DisplayState::Initialized);
        // Settings survive a reset
        assert!(display.config().edge_only);
    }
    
    #[test]
    fn test_reset_clears_transform_status() {
        let (mut display, scene) = setup(StaticFrameTree::new("odom"));
        display.on_config_change(ConfigChange::EdgeOnly(true));
        display.on_message(sample_array(&["car"]));
        assert_eq!(scene.status(TRANSFORM_STATUS).unwrap().level, StatusLevel::Error);
        
        display.reset();
        
        assert!(scene.status(TRANSFORM_STATUS).is_none());
        assert!(display.edge_pool().is_empty());
    }
    
    #[test]
    fn test_message_before_initialize_is_dropped() {
        let scene = RecordingScene::new();
        let mut display = DetectionDisplay::new(DisplayHost::recording(map_tree(), &scene));
        
        display.on_message(sample_array(&["car"]));
        
        assert_eq!(display.state(), DisplayState::Uninitialized);
        assert!(display.latest_message().is_none());
        assert_eq!(scene.submission_count(), 0);
    }
    
    #[test]
    fn test_single_detection_message() {
        let (mut display, scene) = setup(map_tree());
        let detection = sample_array(&["person"]).detections.remove(0).tracked(true);
        
        display.on_message(Detection3DArray::from(detection));
        
        let boxes = scene.markers_in(BOX_NAMESPACE);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].color, color_for(true, Some("person")));
    }
    
    #[test]
    fn test_update_tick_forwarded() {
        let (mut display, scene) = setup(map_tree());
        display.on_update_tick(0.016, 0.016);
        display.on_update_tick(0.016, 0.016);
        assert_eq!(scene.tick_count(), 2);
    }
    
    #[test]
    fn test_load_and_save_config_blob() {
        let (mut display, scene) = setup(map_tree());
        let blob = json!({ "Only Edge": true, "Alpha": 0.5, "Topic": "/detections" });
        
        display.load(&blob).unwrap();
        
        assert!(display.config().edge_only);
        assert_eq!(display.config().alpha, 0.5);
        // The panel shows the loaded values
        assert!(scene.bool_value(DisplayProperty::OnlyEdge));
        assert_eq!(scene.float_value(DisplayProperty::Alpha), 0.5);
        assert!(!scene.bool_value(DisplayProperty::ShowScore));
        assert_eq!(scene.loaded_config(), Some(blob));
        assert!(scene.property(DisplayProperty::LineWidth).unwrap().visible);
        assert_eq!(scene.submission_count() + scene.lines_created(), 0);
        
        let saved = display.save();
        assert_eq!(saved["Topic"], "/detections");
        assert_eq!(saved["Only Edge"], true);
        assert_eq!(saved["Show Score"], false);
    }
    
    #[test]
    fn test_loaded_values_survive_panel_reads() {
        let (mut display, scene) = setup(map_tree());
        display.load(&json!({ "Alpha": 0.5, "Line Width": 0.04 })).unwrap();
        display.on_message(sample_array(&["car"]));
        
        display.on_property_changed(DisplayProperty::Alpha);
        display.on_property_changed(DisplayProperty::LineWidth);
        
        assert_eq!(display.config().alpha, 0.5);
        assert_eq!(display.config().line_width, 0.04);
        assert_eq!(scene.markers_in(BOX_NAMESPACE)[0].color.a, 0.5);
        
        // Ticking the checkbox after loading wireframe mode turns it off
        display.load(&json!({ "Only Edge": true })).unwrap();
        assert_eq!(display.edge_pool().len(), 1);
        scene.set_bool(DisplayProperty::OnlyEdge, false);
        display.on_property_changed(DisplayProperty::OnlyEdge);
        assert!(!display.config().edge_only);
        assert!(display.edge_pool().is_empty());
    }
    
    #[test]
    fn test_load_rejects_bad_blob() {
        let (mut display, scene) = setup(map_tree());
        assert!(display.load(&json!({ "Show Score": 1 })).is_err());
        assert_eq!(*display.config(), DisplayConfig::default());
        assert!(scene.loaded_config().is_none());
    }
}
