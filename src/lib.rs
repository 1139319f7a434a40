//! Ambient halo engine: samples the edges of a playing video and lights a
//! glow around it that follows the picture's colors and brightness.

pub mod brightness;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod halo;
pub mod platform;
pub mod preview;
pub mod sampler;
pub mod settings;
pub mod source;

pub use controller::{AmbilightController, ControllerState, HideReason, TickOutcome};
pub use error::Error;
pub use geometry::{FrameGeometry, Rect};
pub use source::{PlaybackState, ReadyState, SourceId, VideoSource};
