//! In-process transform service backed by a tree of static transforms.

use crate::error::EnvError;
use crate::transform::FrameTransformer;
use crate::types::Pose;
use std::collections::HashMap;

/// A tree of static frames.
///
/// Every registered frame stores its pose relative to its parent
/// (`parent_T_child`). Resolution walks the source frame and the fixed frame
/// up to their root and composes:
///
/// ```text
/// fixed_T_source = inverse(root_T_fixed) * root_T_source
/// ```
///
/// An empty frame id is treated as the fixed frame.
#[derive(Debug, Clone)]
pub struct StaticFrameTree {
    /// Frame every resolved pose is expressed in
    fixed_frame: String,
    
    /// child -> (parent, parent_T_child)
    parents: HashMap<String, (String, Pose)>,
}

impl StaticFrameTree {
    /// Creates an empty tree whose only known frame is `fixed_frame`.
    pub fn new(fixed_frame: impl Into<String>) -> Self {
        Self {
            fixed_frame: fixed_frame.into(),
            parents: HashMap::new(),
        }
    }
    
    /// Registers (or re-parents) `child` under `parent`.
    ///
    /// # Arguments
    /// * `child` - Frame being registered
    /// * `parent` - Frame `child` is attached to
    /// * `parent_from_child` - Pose of `child` expressed in `parent`
    pub fn add_frame(
        &mut self,
        child: impl Into<String>,
        parent: impl Into<String>,
        parent_from_child: Pose,
    ) {
        self.parents
            .insert(child.into(), (parent.into(), parent_from_child));
    }
    
    /// Detaches a frame. Returns false if it was not registered.
    pub fn remove_frame(&mut self, child: &str) -> bool {
        self.parents.remove(child).is_some()
    }
    
    /// Changes the fixed frame.
    pub fn set_fixed_frame(&mut self, frame: impl Into<String>) {
        self.fixed_frame = frame.into();
    }
    
    /// Returns true if the frame is registered, is some frame's parent,
    /// or is the fixed frame.
    pub fn contains(&self, frame: &str) -> bool {
        frame == self.fixed_frame
            || self.parents.contains_key(frame)
            || self.parents.values().any(|(parent, _)| parent == frame)
    }
    
    /// Returns the number of registered child frames.
    pub fn frame_count(&self) -> usize {
        self.parents.len()
    }
    
    /// Walks `frame` up to its root, returning `(root, root_T_frame)`.
    fn to_root(&self, frame: &str) -> Result<(String, Pose), EnvError> {
        if !self.contains(frame) {
            return Err(EnvError::unknown_frame(frame));
        }
        
        let mut current = frame.to_string();
        let mut root_from_frame = Pose::identity();
        
        // A chain longer than the number of edges must revisit a frame
        for _ in 0..=self.parents.len() {
            match self.parents.get(&current) {
                Some((parent, parent_from_current)) => {
                    root_from_frame = parent_from_current * root_from_frame;
                    current = parent.clone();
                }
                None => return Ok((current, root_from_frame)),
            }
        }
        
        Err(EnvError::FrameCycle(frame.to_string()))
    }
}

impl FrameTransformer for StaticFrameTree {
    fn fixed_frame(&self) -> &str {
        &self.fixed_frame
    }
    
    fn resolve(&self, frame_id: &str, pose: &Pose) -> Result<Pose, EnvError> {
        let source = if frame_id.is_empty() {
            self.fixed_frame.as_str()
        } else {
            frame_id
        };
        
        if source == self.fixed_frame {
            return Ok(*pose);
        }
        
        let (source_root, root_from_source) = self.to_root(source)?;
        let (fixed_root, root_from_fixed) = self.to_root(&self.fixed_frame)?;
        
        if source_root != fixed_root {
            tracing::debug!(
                "Frames '{}' (root '{}') and '{}' (root '{}') are disconnected",
                source, source_root, self.fixed_frame, fixed_root
            );
            return Err(EnvError::disconnected(source, &self.fixed_frame));
        }
        
        Ok(root_from_fixed.inverse() * root_from_source * pose)
    }
}
