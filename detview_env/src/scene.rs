//! Scene-graph, status and property-panel abstractions.

use crate::types::{Marker, Pose, Rgba};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Accepts solid primitives and owns their replace-vs-accumulate semantics.
///
/// # Keying
///
/// ```text
/// add_marker(ns="bounding_box", id=0)  -> inserted
/// add_marker(ns="bounding_box", id=0)  -> replaces the previous one
/// clear_markers()                      -> nothing left
/// ```
pub trait MarkerSurface {
    /// Submits a marker; an existing marker with the same key is replaced.
    fn add_marker(&mut self, marker: Marker);
    
    /// Removes every marker submitted so far.
    fn clear_markers(&mut self);
    
    /// Advances any internal animation or fade state.
    fn update(&mut self, wall_dt: f32, sim_dt: f32);
    
    /// Receives the display's opaque configuration blob.
    fn load(&mut self, _config: &serde_json::Value) {}
}

/// A placed object made of independent 2-point lines.
///
/// Dropping the resource releases it from the scene.
pub trait LineResource {
    /// Removes all lines.
    fn clear(&mut self);
    
    /// Places the object in the fixed frame.
    fn set_pose(&mut self, pose: &Pose);
    
    /// Sets the maximum number of points a single line may hold.
    fn set_max_points_per_line(&mut self, max: u32);
    
    /// Sets the number of lines the object reserves.
    fn set_num_lines(&mut self, num: u32);
    
    /// Sets the drawn width of every line, in meters.
    fn set_line_width(&mut self, width: f32);
    
    /// Sets the color of every line.
    fn set_color(&mut self, color: Rgba);
    
    /// Appends a point, in object-local coordinates, to the current line.
    fn add_point(&mut self, point: Point3<f64>);
    
    /// Closes the current line and starts the next one.
    fn finish_line(&mut self);
}

/// Allocates line resources bound to the display's scene node.
pub trait SceneResourceFactory {
    /// Concrete line type handed out by this factory
    type Line: LineResource;
    
    /// Creates a new, empty line resource.
    fn create_line(&mut self) -> Self::Line;
}

/// Severity of a user-visible status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLevel {
    Ok,
    Warn,
    Error,
}

/// Receives non-fatal, user-visible status for a display.
pub trait StatusSink {
    /// Sets the status of `category`, replacing any previous entry.
    fn set_status(&mut self, level: StatusLevel, category: &str, message: &str);
    
    /// Removes the status of `category`.
    fn delete_status(&mut self, category: &str);
}

/// The four user-editable properties of a detection display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DisplayProperty {
    OnlyEdge,
    LineWidth,
    Alpha,
    ShowScore,
}

impl DisplayProperty {
    /// Returns all properties in panel order.
    pub fn all() -> [DisplayProperty; 4] {
        [
            DisplayProperty::OnlyEdge,
            DisplayProperty::LineWidth,
            DisplayProperty::Alpha,
            DisplayProperty::ShowScore,
        ]
    }
    
    /// Returns the label shown in the panel, also used as config key.
    pub fn name(&self) -> &'static str {
        match self {
            DisplayProperty::OnlyEdge => "Only Edge",
            DisplayProperty::LineWidth => "Line Width",
            DisplayProperty::Alpha => "Alpha",
            DisplayProperty::ShowScore => "Show Score",
        }
    }
    
    /// Returns the tooltip shown in the panel.
    pub fn description(&self) -> &'static str {
        match self {
            DisplayProperty::OnlyEdge => "Display only edges of the boxes",
            DisplayProperty::LineWidth => "Line width of edges",
            DisplayProperty::Alpha => "Transparency",
            DisplayProperty::ShowScore => "Display score next to bounding boxes",
        }
    }
    
    /// Returns true for boolean-valued properties.
    pub fn is_bool(&self) -> bool {
        matches!(self, DisplayProperty::OnlyEdge | DisplayProperty::ShowScore)
    }
}

impl std::fmt::Display for DisplayProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The property panel widgets backing a display.
///
/// The panel holds the current values and enforces bounds; change
/// notifications are delivered to the display by the embedding host.
pub trait PropertyPanel {
    /// Shows or hides a property widget.
    fn set_visible(&mut self, property: DisplayProperty, visible: bool);
    
    /// Sets the inclusive bounds enforced on a float property.
    fn set_bounds(&mut self, property: DisplayProperty, min: f32, max: f32);
    
    /// Sets the value of a boolean property.
    fn set_bool_value(&mut self, property: DisplayProperty, value: bool);
    
    /// Sets the value of a float property. The panel enforces its bounds.
    fn set_float_value(&mut self, property: DisplayProperty, value: f32);
    
    /// Returns the current value of a boolean property.
    fn bool_value(&self, property: DisplayProperty) -> bool;
    
    /// Returns the current value of a float property.
    fn float_value(&self, property: DisplayProperty) -> f32;
}
