//! The playable video surface the halo follows.

use image::RgbaImage;
use serde::Deserialize;

use crate::error::Error;
use crate::geometry::Rect;

/// Playback state as reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Ended,
}

/// How much decoded media the source has available, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

/// Stable identity of a source, used to match resize notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// A video element as seen by the halo engine.
///
/// Implementations are owned by the host; the controller only keeps a weak
/// reference while a session is live.
pub trait VideoSource {
    fn id(&self) -> SourceId;

    /// Decoded frame size in pixels. `(0, 0)` before metadata is available.
    fn intrinsic_size(&self) -> (u32, u32);

    fn playback(&self) -> PlaybackState;

    fn ready_state(&self) -> ReadyState;

    /// Rendered box in layout coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Draw the current frame into `target`, which is already sized to
    /// [`intrinsic_size`](Self::intrinsic_size).
    ///
    /// # Errors
    /// Returns [`Error::FrameRead`] when the pixels cannot be read back, for
    /// example because the frame comes from a cross-origin resource.
    fn draw_frame(&self, target: &mut RgbaImage) -> Result<(), Error>;

    /// Whether some controller currently runs a session on this source.
    fn is_active(&self) -> bool;

    /// Called with `Some(layer)` when a session binds to this source and with
    /// `None` when it is torn down. `layer` is the stacking index the video
    /// should adopt so the halo can sit right below it.
    fn mark_active(&self, layer: Option<i32>);
}
