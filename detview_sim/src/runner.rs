//! Replay runner: feeds a sample topic through a `DetectionDisplay`.

use crate::exporter::{BoxRecord, EdgeRecord, LabelRecord, SimExport, SimFrame};
use crate::publisher::SamplePublisher;
use crate::topics::SampleTopic;
use detview_core::display::TRANSFORM_STATUS;
use detview_core::geometry::{BOX_NAMESPACE, SCORE_NAMESPACE};
use detview_core::{ConfigError, DetectionDisplay, DisplayConfig, DisplayHost};
use detview_env::{
    DisplayProperty, Pose, RecordingScene, SceneResourceFactory, StaticFrameTree, StatusLevel,
};
use nalgebra::{Translation3, UnitQuaternion, Vector3};
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a replay run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid display config: {0}")]
    Config(#[from] ConfigError),
    
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    
    #[error("visualization unavailable: {0}")]
    Visualization(String),
}

/// Configuration for a replay run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Seed for the sample publisher
    pub seed: u64,
    
    /// Topic to replay
    pub topic: SampleTopic,
    
    /// Number of messages to publish
    pub frames: u64,
    
    /// Fixed frame of the display
    pub fixed_frame: String,
    
    /// Frame the samples are stamped in
    pub source_frame: String,
    
    /// Start in wireframe mode
    pub edge_only: bool,
    
    /// Wireframe width override
    pub line_width: Option<f32>,
    
    /// Alpha override
    pub alpha: Option<f32>,
    
    /// Start with score labels on
    pub show_score: bool,
    
    /// Saved display config to load before the first message
    pub config_blob: Option<serde_json::Value>,
    
    /// Flip wireframe mode every n messages
    pub toggle_every: Option<u64>,
    
    /// Capture every frame for export
    pub export: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            topic: SampleTopic::Array,
            frames: 20,
            fixed_frame: "map".to_string(),
            source_frame: "map".to_string(),
            edge_only: false,
            line_width: None,
            alpha: None,
            show_score: false,
            config_blob: None,
            toggle_every: None,
            export: false,
        }
    }
}

/// Outcome of a replay run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub topic: String,
    pub seed: u64,
    pub frames: u64,
    pub detections: usize,
    pub toggles: u64,
    pub transform_errors: usize,
    pub final_config: DisplayConfig,
    #[serde(skip)]
    pub export: Option<SimExport>,
}

/// The frames the samples can be resolved through.
///
/// ```text
/// map
///  └── odom        (+2 m along x)
///       └── base_link (+0.5 m along x, yawed 90°)
/// ```
pub fn sample_frame_tree(fixed_frame: &str) -> StaticFrameTree {
    let mut tree = StaticFrameTree::new(fixed_frame);
    tree.add_frame("odom", "map", Pose::translation(2.0, 0.0, 0.0));
    tree.add_frame(
        "base_link",
        "odom",
        Pose::from_parts(
            Translation3::new(0.5, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        ),
    );
    tree
}

/// Runs one topic through a display.
pub struct SimRunner {
    config: SimConfig,
}

impl SimRunner {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }
    
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
    
    /// Replays into a recording scene, capturing frames when export is on.
    pub fn run(&self) -> Result<RunSummary, SimError> {
        let scene = RecordingScene::new();
        let host = DisplayHost::recording(sample_frame_tree(&self.config.fixed_frame), &scene);
        let mut display = DetectionDisplay::new(host);
        
        let mut export = self.config.export.then(|| {
            SimExport::new(self.config.topic.name(), self.config.seed, &self.config.fixed_frame)
        });
        
        let mut summary = self.drive(&mut display, &scene, |index, stamp, display| {
            if let Some(export) = export.as_mut() {
                export.add_frame(capture_frame(index, stamp, display, &scene));
            }
        })?;
        
        summary.transform_errors = scene.error_count();
        if let Some(mut export) = export {
            export.finalize(display.save());
            summary.export = Some(export);
        }
        Ok(summary)
    }
    
    /// Replays into a Rerun viewer.
    #[cfg(feature = "visualization")]
    pub fn run_rerun(&self, app_id: &str) -> Result<RunSummary, SimError> {
        use detview_core::RerunScene;
        
        let rerun = RerunScene::spawn(app_id)
            .map_err(|e| SimError::Visualization(e.to_string()))?
            .with_frames(sample_frame_tree(&self.config.fixed_frame));
        let panel = RecordingScene::new();
        let host = DisplayHost {
            frames: Box::new(sample_frame_tree(&self.config.fixed_frame)),
            markers: Box::new(rerun.clone()),
            status: Box::new(rerun.clone()),
            properties: Box::new(panel.clone()),
            scene: rerun,
        };
        let mut display = DetectionDisplay::new(host);
        
        self.drive(&mut display, &panel, |_, _, _| {})
    }
    
    fn drive<F: SceneResourceFactory>(
        &self,
        display: &mut DetectionDisplay<F>,
        panel: &RecordingScene,
        mut observe: impl FnMut(u64, Duration, &DetectionDisplay<F>),
    ) -> Result<RunSummary, SimError> {
        let config = &self.config;
        display.initialize();
        if let Some(blob) = &config.config_blob {
            display.load(blob)?;
        }
        self.apply_overrides(display, panel);
        
        let mut publisher = SamplePublisher::new(config.topic, config.seed, config.source_frame.clone());
        let dt = config.topic.period_secs() as f32;
        let mut toggles = 0;
        let mut detections = 0;
        
        info!(
            "Replaying {} ({}) for {} frames into fixed frame '{}'",
            config.topic,
            config.topic.description(),
            config.frames,
            config.fixed_frame
        );
        
        for index in 0..config.frames {
            if let Some(every) = config.toggle_every.filter(|every| *every > 0) {
                if index > 0 && index % every == 0 {
                    let edge_only = !display.config().edge_only;
                    panel.set_bool(DisplayProperty::OnlyEdge, edge_only);
                    display.on_property_changed(DisplayProperty::OnlyEdge);
                    toggles += 1;
                    debug!("Frame {}: edge_only -> {}", index, edge_only);
                }
            }
            
            let message = publisher.next_message();
            let stamp = message.header.stamp;
            detections += message.len();
            
            display.on_message(message);
            display.on_update_tick(dt, dt);
            observe(index, stamp, display);
        }
        
        Ok(RunSummary {
            topic: config.topic.name().to_string(),
            seed: config.seed,
            frames: config.frames,
            detections,
            toggles,
            transform_errors: 0,
            final_config: *display.config(),
            export: None,
        })
    }
    
    /// Pushes command-line settings through the property panel.
    fn apply_overrides<F: SceneResourceFactory>(
        &self,
        display: &mut DetectionDisplay<F>,
        panel: &RecordingScene,
    ) {
        let config = &self.config;
        if config.edge_only {
            panel.set_bool(DisplayProperty::OnlyEdge, true);
            display.on_property_changed(DisplayProperty::OnlyEdge);
        }
        if let Some(width) = config.line_width {
            panel.set_float(DisplayProperty::LineWidth, width);
            display.on_property_changed(DisplayProperty::LineWidth);
        }
        if let Some(alpha) = config.alpha {
            panel.set_float(DisplayProperty::Alpha, alpha);
            display.on_property_changed(DisplayProperty::Alpha);
        }
        if config.show_score {
            panel.set_bool(DisplayProperty::ShowScore, true);
            display.on_property_changed(DisplayProperty::ShowScore);
        }
    }
}

fn capture_frame(
    index: u64,
    stamp: Duration,
    display: &DetectionDisplay<RecordingScene>,
    scene: &RecordingScene,
) -> SimFrame {
    let mode = if display.config().edge_only { "edges" } else { "boxes" };
    
    SimFrame {
        index,
        time_sec: stamp.as_secs_f64(),
        mode: mode.to_string(),
        boxes: scene
            .markers_in(BOX_NAMESPACE)
            .iter()
            .map(BoxRecord::from_marker)
            .collect(),
        labels: scene
            .markers_in(SCORE_NAMESPACE)
            .iter()
            .filter_map(LabelRecord::from_marker)
            .collect(),
        edges: display
            .edge_pool()
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(id, line)| EdgeRecord::from_line(id, line))
            .collect(),
        status: scene
            .status(TRANSFORM_STATUS)
            .filter(|entry| entry.level == StatusLevel::Error)
            .map(|entry| entry.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;
    
    fn exported(config: SimConfig) -> SimExport {
        let summary = SimRunner::new(SimConfig { export: true, ..config })
            .run()
            .unwrap();
        summary.export.unwrap()
    }
    
    #[test]
    fn test_array_replay_renders_boxes() {
        let summary = SimRunner::new(SimConfig {
            frames: 3,
            export: true,
            ..Default::default()
        })
        .run()
        .unwrap();
        
        assert_eq!(summary.detections, 75);
        assert_eq!(summary.transform_errors, 0);
        
        let export = summary.export.unwrap();
        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.frames[2].boxes.len(), 25);
        assert!(export.frames[2].edges.is_empty());
        assert!(export.frames[2].labels.is_empty());
    }
    
    #[test]
    fn test_edge_replay_in_child_frame() {
        let export = exported(SimConfig {
            frames: 1,
            edge_only: true,
            fixed_frame: "odom".to_string(),
            ..Default::default()
        });
        
        let frame = &export.frames[0];
        assert_eq!(frame.mode, "edges");
        assert!(frame.boxes.is_empty());
        assert_eq!(frame.edges.len(), 25);
        assert!(frame.edges.iter().all(|edge| edge.segments.len() == 12));
        
        // Every corner appears in three segments, so the mean endpoint is the center
        let first = &frame.edges[0];
        let mut mean = Vector3::zeros();
        for segment in &first.segments {
            for point in segment {
                mean += Vector3::new(point[0], point[1], point[2]);
            }
        }
        mean /= 24.0;
        assert_relative_eq!(mean, Vector3::new(-0.5, 1.5, 0.0), epsilon = 1e-9);
    }
    
    #[test]
    fn test_unknown_fixed_frame_reports_every_pass() {
        let summary = SimRunner::new(SimConfig {
            frames: 4,
            edge_only: true,
            fixed_frame: "nowhere".to_string(),
            export: true,
            ..Default::default()
        })
        .run()
        .unwrap();
        
        assert_eq!(summary.transform_errors, 4);
        let export = summary.export.unwrap();
        for frame in &export.frames {
            assert!(frame.edges.is_empty());
            assert!(frame.status.is_some());
        }
    }
    
    #[test]
    fn test_toggle_every_flips_mode() {
        let summary = SimRunner::new(SimConfig {
            frames: 5,
            toggle_every: Some(2),
            export: true,
            ..Default::default()
        })
        .run()
        .unwrap();
        
        assert_eq!(summary.toggles, 2);
        assert!(!summary.final_config.edge_only);
        
        let modes: Vec<_> = summary
            .export
            .unwrap()
            .frames
            .iter()
            .map(|frame| frame.mode.clone())
            .collect();
        assert_eq!(modes, ["boxes", "boxes", "edges", "edges", "boxes"]);
    }
    
    #[test]
    fn test_show_score_adds_labels() {
        let export = exported(SimConfig {
            frames: 1,
            show_score: true,
            ..Default::default()
        });
        
        let frame = &export.frames[0];
        assert_eq!(frame.labels.len(), 25);
        // Row 2 carries score 2.0
        assert!(frame.labels.iter().any(|label| label.text == "2.00"));
    }
    
    #[test]
    fn test_config_blob_is_loaded_and_saved() {
        let export = exported(SimConfig {
            frames: 1,
            config_blob: Some(json!({"Only Edge": true, "Alpha": 0.5, "Custom": 1})),
            ..Default::default()
        });
        
        assert_eq!(export.frames[0].mode, "edges");
        assert_eq!(export.final_config["Custom"], json!(1));
        assert_eq!(export.final_config["Alpha"], json!(0.5));
        assert_eq!(export.final_config["Only Edge"], json!(true));
    }
    
    #[test]
    fn test_invalid_config_blob_aborts() {
        let result = SimRunner::new(SimConfig {
            config_blob: Some(json!({"Alpha": "high"})),
            ..Default::default()
        })
        .run();
        
        assert!(matches!(result, Err(SimError::Config(_))));
    }
    
    #[test]
    fn test_same_seed_same_export() {
        let config = SimConfig {
            frames: 3,
            show_score: true,
            ..Default::default()
        };
        let a = serde_json::to_value(exported(config.clone())).unwrap();
        let b = serde_json::to_value(exported(config)).unwrap();
        assert_eq!(a, b);
    }
}
