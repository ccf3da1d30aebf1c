//! Reference-frame transform service.

use crate::error::EnvError;
use crate::types::Pose;

/// Maps poses from a source frame into the display's fixed frame.
///
/// The lookup is synchronous: it either succeeds or fails within the
/// same call. There is no pending state and nothing to retry.
///
/// # Implementations
///
/// - **In-process**: [`StaticFrameTree`](crate::StaticFrameTree) - a tree of
///   static transforms registered up front
/// - **Host viewer**: whatever frame manager the embedding viewer exposes
pub trait FrameTransformer {
    /// Returns the id of the fixed frame all resolved poses are expressed in.
    fn fixed_frame(&self) -> &str;
    
    /// Resolves `pose`, expressed in `frame_id`, into the fixed frame.
    ///
    /// # Returns
    /// * `Ok(pose)` - The pose expressed in [`fixed_frame`](Self::fixed_frame)
    /// * `Err(EnvError::UnknownFrame)` - `frame_id` (or the fixed frame) is unknown
    /// * `Err(EnvError::Disconnected)` - No transform chain connects the two frames
    fn resolve(&self, frame_id: &str, pose: &Pose) -> Result<Pose, EnvError>;
}
