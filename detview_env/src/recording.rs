//! Recording host: an in-process scene that remembers every call.
//!
//! Cloning a [`RecordingScene`] yields another handle onto the same log, so
//! one clone can be handed to the display as its marker surface, another as
//! its property panel, and a third kept by the caller for inspection.

use crate::scene::{
    DisplayProperty, LineResource, MarkerSurface, PropertyPanel, SceneResourceFactory,
    StatusLevel, StatusSink,
};
use crate::types::{Marker, Pose, Rgba};
use nalgebra::Point3;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// One status report.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub level: StatusLevel,
    pub category: String,
    pub message: String,
}

/// Current state of one property widget.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyState {
    pub visible: bool,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub bool_value: bool,
    pub float_value: f32,
}

impl PropertyState {
    fn new_bool(value: bool) -> Self {
        Self {
            visible: true,
            min: None,
            max: None,
            bool_value: value,
            float_value: 0.0,
        }
    }
    
    fn new_float(value: f32) -> Self {
        Self {
            visible: true,
            min: None,
            max: None,
            bool_value: false,
            float_value: value,
        }
    }
    
    fn clamp(&self, value: f32) -> f32 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

#[derive(Debug, Default)]
struct SceneLog {
    markers: BTreeMap<(String, usize), Marker>,
    submissions: usize,
    clears: usize,
    ticks: usize,
    lines_created: usize,
    lines_released: usize,
    statuses: BTreeMap<String, StatusEntry>,
    status_history: Vec<StatusEntry>,
    properties: BTreeMap<DisplayProperty, PropertyState>,
    loaded_config: Option<serde_json::Value>,
}

/// Recording implementation of every scene-side host trait.
#[derive(Debug, Clone)]
pub struct RecordingScene {
    log: Rc<RefCell<SceneLog>>,
}

impl RecordingScene {
    /// Creates a scene whose panel holds the stock property defaults.
    pub fn new() -> Self {
        let mut log = SceneLog::default();
        log.properties
            .insert(DisplayProperty::OnlyEdge, PropertyState::new_bool(false));
        log.properties
            .insert(DisplayProperty::LineWidth, PropertyState::new_float(0.05));
        log.properties
            .insert(DisplayProperty::Alpha, PropertyState::new_float(1.0));
        log.properties
            .insert(DisplayProperty::ShowScore, PropertyState::new_bool(false));
        
        Self {
            log: Rc::new(RefCell::new(log)),
        }
    }
    
    /// Simulates the user ticking a boolean property.
    pub fn set_bool(&self, property: DisplayProperty, value: bool) {
        let mut log = self.log.borrow_mut();
        if let Some(state) = log.properties.get_mut(&property) {
            state.bool_value = value;
        }
    }
    
    /// Simulates the user editing a float property. Returns the value the
    /// panel actually stored after bound enforcement.
    pub fn set_float(&self, property: DisplayProperty, value: f32) -> f32 {
        let mut log = self.log.borrow_mut();
        match log.properties.get_mut(&property) {
            Some(state) => {
                state.float_value = state.clamp(value);
                state.float_value
            }
            None => value,
        }
    }
    
    /// Returns the state of a property widget.
    pub fn property(&self, property: DisplayProperty) -> Option<PropertyState> {
        self.log.borrow().properties.get(&property).cloned()
    }
    
    /// Returns all live markers ordered by `(namespace, id)`.
    pub fn markers(&self) -> Vec<Marker> {
        self.log.borrow().markers.values().cloned().collect()
    }
    
    /// Returns the live markers of one namespace ordered by id.
    pub fn markers_in(&self, namespace: &str) -> Vec<Marker> {
        self.log
            .borrow()
            .markers
            .values()
            .filter(|m| m.namespace == namespace)
            .cloned()
            .collect()
    }
    
    /// Number of live markers.
    pub fn marker_count(&self) -> usize {
        self.log.borrow().markers.len()
    }
    
    /// Total number of `add_marker` calls.
    pub fn submission_count(&self) -> usize {
        self.log.borrow().submissions
    }
    
    /// Total number of `clear_markers` calls.
    pub fn clear_count(&self) -> usize {
        self.log.borrow().clears
    }
    
    /// Total number of update ticks forwarded.
    pub fn tick_count(&self) -> usize {
        self.log.borrow().ticks
    }
    
    /// Total number of line resources created.
    pub fn lines_created(&self) -> usize {
        self.log.borrow().lines_created
    }
    
    /// Total number of line resources released.
    pub fn lines_released(&self) -> usize {
        self.log.borrow().lines_released
    }
    
    /// Number of line resources currently alive.
    pub fn live_lines(&self) -> usize {
        let log = self.log.borrow();
        log.lines_created - log.lines_released
    }
    
    /// Returns the current status of a category.
    pub fn status(&self, category: &str) -> Option<StatusEntry> {
        self.log.borrow().statuses.get(category).cloned()
    }
    
    /// Returns every status report in order.
    pub fn status_history(&self) -> Vec<StatusEntry> {
        self.log.borrow().status_history.clone()
    }
    
    /// Number of error-level reports so far.
    pub fn error_count(&self) -> usize {
        self.log
            .borrow()
            .status_history
            .iter()
            .filter(|entry| entry.level == StatusLevel::Error)
            .count()
    }
    
    /// Returns the last config blob handed to `MarkerSurface::load`.
    pub fn loaded_config(&self) -> Option<serde_json::Value> {
        self.log.borrow().loaded_config.clone()
    }
}

impl Default for RecordingScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerSurface for RecordingScene {
    fn add_marker(&mut self, marker: Marker) {
        let mut log = self.log.borrow_mut();
        log.submissions += 1;
        log.markers.insert(marker.key(), marker);
    }
    
    fn clear_markers(&mut self) {
        let mut log = self.log.borrow_mut();
        log.clears += 1;
        log.markers.clear();
    }
    
    fn update(&mut self, _wall_dt: f32, _sim_dt: f32) {
        self.log.borrow_mut().ticks += 1;
    }
    
    fn load(&mut self, config: &serde_json::Value) {
        self.log.borrow_mut().loaded_config = Some(config.clone());
    }
}

impl SceneResourceFactory for RecordingScene {
    type Line = RecordedLine;
    
    fn create_line(&mut self) -> RecordedLine {
        let serial = {
            let mut log = self.log.borrow_mut();
            log.lines_created += 1;
            log.lines_created
        };
        RecordedLine::new(serial, Rc::clone(&self.log))
    }
}

impl StatusSink for RecordingScene {
    fn set_status(&mut self, level: StatusLevel, category: &str, message: &str) {
        let entry = StatusEntry {
            level,
            category: category.to_string(),
            message: message.to_string(),
        };
        let mut log = self.log.borrow_mut();
        log.status_history.push(entry.clone());
        log.statuses.insert(category.to_string(), entry);
    }
    
    fn delete_status(&mut self, category: &str) {
        self.log.borrow_mut().statuses.remove(category);
    }
}

impl PropertyPanel for RecordingScene {
    fn set_visible(&mut self, property: DisplayProperty, visible: bool) {
        if let Some(state) = self.log.borrow_mut().properties.get_mut(&property) {
            state.visible = visible;
        }
    }
    
    fn set_bounds(&mut self, property: DisplayProperty, min: f32, max: f32) {
        if let Some(state) = self.log.borrow_mut().properties.get_mut(&property) {
            state.min = Some(min);
            state.max = Some(max);
        }
    }
    
    fn set_bool_value(&mut self, property: DisplayProperty, value: bool) {
        self.set_bool(property, value);
    }
    
    fn set_float_value(&mut self, property: DisplayProperty, value: f32) {
        self.set_float(property, value);
    }
    
    fn bool_value(&self, property: DisplayProperty) -> bool {
        self.log
            .borrow()
            .properties
            .get(&property)
            .map_or(false, |state| state.bool_value)
    }
    
    fn float_value(&self, property: DisplayProperty) -> f32 {
        self.log
            .borrow()
            .properties
            .get(&property)
            .map_or(0.0, |state| state.float_value)
    }
}

/// A line resource that keeps its content for inspection.
#[derive(Debug)]
pub struct RecordedLine {
    serial: usize,
    pose: Pose,
    max_points_per_line: u32,
    num_lines: u32,
    line_width: f32,
    color: Rgba,
    finished: Vec<Vec<Point3<f64>>>,
    current: Vec<Point3<f64>>,
    clears: usize,
    log: Rc<RefCell<SceneLog>>,
}

impl RecordedLine {
    fn new(serial: usize, log: Rc<RefCell<SceneLog>>) -> Self {
        Self {
            serial,
            pose: Pose::identity(),
            max_points_per_line: 0,
            num_lines: 0,
            line_width: 0.0,
            color: Rgba::WHITE,
            finished: Vec::new(),
            current: Vec::new(),
            clears: 0,
            log,
        }
    }
    
    /// Creation order of this resource within its scene (1-based).
    pub fn serial(&self) -> usize {
        self.serial
    }
    
    pub fn pose(&self) -> &Pose {
        &self.pose
    }
    
    pub fn max_points_per_line(&self) -> u32 {
        self.max_points_per_line
    }
    
    pub fn num_lines(&self) -> u32 {
        self.num_lines
    }
    
    pub fn line_width(&self) -> f32 {
        self.line_width
    }
    
    pub fn color(&self) -> Rgba {
        self.color
    }
    
    /// Number of times the content was cleared.
    pub fn clear_count(&self) -> usize {
        self.clears
    }
    
    /// Returns every line, including the one still open.
    pub fn lines(&self) -> Vec<Vec<Point3<f64>>> {
        let mut lines = self.finished.clone();
        if !self.current.is_empty() {
            lines.push(self.current.clone());
        }
        lines
    }
    
    /// Returns true if the resource holds no points.
    pub fn is_empty(&self) -> bool {
        self.finished.is_empty() && self.current.is_empty()
    }
}

impl LineResource for RecordedLine {
    fn clear(&mut self) {
        self.finished.clear();
        self.current.clear();
        self.clears += 1;
    }
    
    fn set_pose(&mut self, pose: &Pose) {
        self.pose = *pose;
    }
    
    fn set_max_points_per_line(&mut self, max: u32) {
        self.max_points_per_line = max;
    }
    
    fn set_num_lines(&mut self, num: u32) {
        self.num_lines = num;
    }
    
    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }
    
    fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }
    
    fn add_point(&mut self, point: Point3<f64>) {
        self.current.push(point);
    }
    
    fn finish_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.finished.push(line);
    }
}

impl Drop for RecordedLine {
    fn drop(&mut self) {
        self.log.borrow_mut().lines_released += 1;
    }
}
