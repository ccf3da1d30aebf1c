//! Display configuration and typed change events.

use crate::error::ConfigError;
use detview_env::{DisplayProperty, PropertyPanel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive bounds of the line-width control, in meters
pub const LINE_WIDTH_BOUNDS: (f32, f32) = (0.01, 0.1);

/// Inclusive bounds of the alpha control
pub const ALPHA_BOUNDS: (f32, f32) = (0.1, 1.0);

/// Line width used until the user first edits the control
pub const DEFAULT_LINE_WIDTH: f32 = 0.2;

/// Current display settings, read on every render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Draw wireframes instead of solid boxes
    pub edge_only: bool,
    
    /// Wireframe line width (only meaningful with `edge_only`)
    pub line_width: f32,
    
    /// Opacity applied to every primitive
    pub alpha: f32,
    
    /// Draw score labels above boxes
    pub show_score: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            edge_only: false,
            line_width: DEFAULT_LINE_WIDTH,
            alpha: 1.0,
            show_score: false,
        }
    }
}

/// A change to one configuration field, carrying the new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    EdgeOnly(bool),
    LineWidth(f32),
    Alpha(f32),
    ShowScore(bool),
}

impl ConfigChange {
    /// Returns the field this change targets.
    pub fn field(&self) -> DisplayProperty {
        match self {
            ConfigChange::EdgeOnly(_) => DisplayProperty::OnlyEdge,
            ConfigChange::LineWidth(_) => DisplayProperty::LineWidth,
            ConfigChange::Alpha(_) => DisplayProperty::Alpha,
            ConfigChange::ShowScore(_) => DisplayProperty::ShowScore,
        }
    }
    
    /// Builds the change for `field` from the panel's current value.
    pub fn read(field: DisplayProperty, panel: &dyn PropertyPanel) -> Self {
        match field {
            DisplayProperty::OnlyEdge => ConfigChange::EdgeOnly(panel.bool_value(field)),
            DisplayProperty::LineWidth => ConfigChange::LineWidth(panel.float_value(field)),
            DisplayProperty::Alpha => ConfigChange::Alpha(panel.float_value(field)),
            DisplayProperty::ShowScore => ConfigChange::ShowScore(panel.bool_value(field)),
        }
    }
    
    /// Writes this change's value into the panel widget of its field.
    pub fn write(&self, panel: &mut dyn PropertyPanel) {
        let field = self.field();
        match *self {
            ConfigChange::EdgeOnly(value) | ConfigChange::ShowScore(value) => {
                panel.set_bool_value(field, value)
            }
            ConfigChange::LineWidth(value) | ConfigChange::Alpha(value) => {
                panel.set_float_value(field, value)
            }
        }
    }
    
    /// Builds the change for `field` from a config-blob value.
    fn from_json(field: DisplayProperty, value: &Value) -> Result<Self, ConfigError> {
        if field.is_bool() {
            let flag = value.as_bool().ok_or_else(|| ConfigError::WrongType {
                property: field.name(),
                expected: "boolean",
                found: json_type(value).to_string(),
            })?;
            Ok(match field {
                DisplayProperty::OnlyEdge => ConfigChange::EdgeOnly(flag),
                _ => ConfigChange::ShowScore(flag),
            })
        } else {
            let number = value.as_f64().ok_or_else(|| ConfigError::WrongType {
                property: field.name(),
                expected: "number",
                found: json_type(value).to_string(),
            })? as f32;
            Ok(match field {
                DisplayProperty::LineWidth => ConfigChange::LineWidth(number),
                _ => ConfigChange::Alpha(number),
            })
        }
    }
}

impl DisplayConfig {
    /// Returns the current value of `field` as a change.
    pub fn change_for(&self, field: DisplayProperty) -> ConfigChange {
        match field {
            DisplayProperty::OnlyEdge => ConfigChange::EdgeOnly(self.edge_only),
            DisplayProperty::LineWidth => ConfigChange::LineWidth(self.line_width),
            DisplayProperty::Alpha => ConfigChange::Alpha(self.alpha),
            DisplayProperty::ShowScore => ConfigChange::ShowScore(self.show_score),
        }
    }
    
    /// Applies one change. Float values are clamped to their bounds.
    pub fn apply(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::EdgeOnly(edge_only) => self.edge_only = edge_only,
            ConfigChange::LineWidth(width) => {
                self.line_width = width.clamp(LINE_WIDTH_BOUNDS.0, LINE_WIDTH_BOUNDS.1)
            }
            ConfigChange::Alpha(alpha) => self.alpha = alpha.clamp(ALPHA_BOUNDS.0, ALPHA_BOUNDS.1),
            ConfigChange::ShowScore(show) => self.show_score = show,
        }
    }
    
    /// Merges the known keys of a config blob into this config.
    ///
    /// Either every present key is applied or, on error, none is.
    /// Unknown keys are ignored.
    pub fn merge_blob(&mut self, blob: &Value) -> Result<(), ConfigError> {
        let map = blob
            .as_object()
            .ok_or_else(|| ConfigError::NotAnObject(json_type(blob).to_string()))?;
        
        let mut next = *self;
        for field in DisplayProperty::all() {
            if let Some(value) = map.get(field.name()) {
                next.apply(ConfigChange::from_json(field, value)?);
            }
        }
        
        *self = next;
        Ok(())
    }
    
    /// Writes the four known keys into `blob`, keeping everything else.
    pub fn write_blob(&self, blob: &mut Value) {
        if !blob.is_object() {
            *blob = Value::Object(Default::default());
        }
        if let Some(map) = blob.as_object_mut() {
            map.insert(DisplayProperty::OnlyEdge.name().into(), self.edge_only.into());
            map.insert(DisplayProperty::LineWidth.name().into(), self.line_width.into());
            map.insert(DisplayProperty::Alpha.name().into(), self.alpha.into());
            map.insert(DisplayProperty::ShowScore.name().into(), self.show_score.into());
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detview_env::RecordingScene;
    use serde_json::json;
    
    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert!(!config.edge_only);
        assert!(!config.show_score);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.line_width, 0.2);
    }
    
    #[test]
    fn test_apply_clamps_floats() {
        let mut config = DisplayConfig::default();
        
        config.apply(ConfigChange::Alpha(0.0));
        assert_eq!(config.alpha, 0.1);
        
        config.apply(ConfigChange::LineWidth(0.5));
        assert_eq!(config.line_width, 0.1);
        
        config.apply(ConfigChange::LineWidth(0.03));
        assert_eq!(config.line_width, 0.03);
    }
    
    #[test]
    fn test_change_field() {
        assert_eq!(ConfigChange::EdgeOnly(true).field(), DisplayProperty::OnlyEdge);
        assert_eq!(ConfigChange::ShowScore(true).field(), DisplayProperty::ShowScore);
    }
    
    #[test]
    fn test_read_from_panel() {
        let panel = RecordingScene::new();
        panel.set_bool(DisplayProperty::ShowScore, true);
        panel.set_float(DisplayProperty::Alpha, 0.25);
        
        assert_eq!(
            ConfigChange::read(DisplayProperty::ShowScore, &panel),
            ConfigChange::ShowScore(true)
        );
        assert_eq!(
            ConfigChange::read(DisplayProperty::Alpha, &panel),
            ConfigChange::Alpha(0.25)
        );
    }
    
    #[test]
    fn test_merge_blob() {
        let mut config = DisplayConfig::default();
        let blob = json!({
            "Only Edge": true,
            "Line Width": 0.05,
            "Topic": "/detections",
        });
        
        config.merge_blob(&blob).unwrap();
        assert!(config.edge_only);
        assert_eq!(config.line_width, 0.05);
        assert_eq!(config.alpha, 1.0);
    }
    
    #[test]
    fn test_merge_blob_is_atomic() {
        let mut config = DisplayConfig::default();
        let blob = json!({ "Only Edge": true, "Alpha": "opaque" });
        
        let err = config.merge_blob(&blob).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WrongType {
                property: "Alpha",
                expected: "number",
                found: "string".to_string(),
            }
        );
        assert_eq!(config, DisplayConfig::default());
    }
    
    #[test]
    fn test_merge_blob_rejects_non_object() {
        let mut config = DisplayConfig::default();
        assert_eq!(
            config.merge_blob(&json!([1, 2])).unwrap_err(),
            ConfigError::NotAnObject("array".to_string())
        );
    }
    
    #[test]
    fn test_write_blob_keeps_unknown_keys() {
        let config = DisplayConfig {
            show_score: true,
            ..Default::default()
        };
        let mut blob = json!({ "Topic": "/detections" });
        
        config.write_blob(&mut blob);
        assert_eq!(blob["Topic"], "/detections");
        assert_eq!(blob["Show Score"], true);
        assert_eq!(blob["Only Edge"], false);
        
        let mut restored = DisplayConfig::default();
        restored.merge_blob(&blob).unwrap();
        assert!(restored.show_score);
    }
}
