//! YAML configuration for the halo engine and the preview host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::brightness::OpacityRange;
use crate::halo::GlowOptions;
use crate::source::ReadyState;

/// Largest accepted glow offset, blur or spread, in CSS pixels.
pub const MAX_GLOW_PX: f32 = 4096.0;
/// Largest accepted edge of the preview's video box, in pixels.
pub const MAX_LAYOUT_PX: f32 = 16384.0;

/// Tunables of the halo engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HaloOptions {
    pub min_opacity: f32,
    pub max_opacity: f32,
    /// Ticks on sources below this readiness hide the halo instead of sampling.
    pub min_ready_state: ReadyState,
    /// Thickness of each edge strip in pixels.
    pub sample_depth: u32,
    pub glow: GlowOptions,
    /// Stacking index given to the video; the halo sits one below it.
    pub video_layer: i32,
}

impl HaloOptions {
    pub fn opacity_range(&self) -> OpacityRange {
        OpacityRange {
            min: self.min_opacity,
            max: self.max_opacity,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.min_opacity),
            "halo.min-opacity must be within [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&self.max_opacity),
            "halo.max-opacity must be within [0, 1]"
        );
        ensure!(
            self.min_opacity <= self.max_opacity,
            "halo.min-opacity must not exceed halo.max-opacity"
        );
        ensure!(self.sample_depth > 0, "halo.sample-depth must be greater than zero");
        ensure!(
            self.glow.offset_px >= 0.0 && self.glow.blur_px >= 0.0 && self.glow.spread_px >= 0.0,
            "halo.glow values must be non-negative"
        );
        ensure!(
            self.glow.offset_px <= MAX_GLOW_PX
                && self.glow.blur_px <= MAX_GLOW_PX
                && self.glow.spread_px <= MAX_GLOW_PX,
            "halo.glow values must not exceed {MAX_GLOW_PX}px"
        );
        Ok(())
    }
}

impl Default for HaloOptions {
    fn default() -> Self {
        Self {
            min_opacity: OpacityRange::DEFAULT_MIN,
            max_opacity: OpacityRange::DEFAULT_MAX,
            min_ready_state: ReadyState::HaveFutureData,
            sample_depth: 1,
            glow: GlowOptions::default(),
            video_layer: i32::MAX,
        }
    }
}

/// Settings of the headless preview host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PreviewOptions {
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Stop after this many refresh callbacks.
    pub max_frames: u32,
    pub output_dir: PathBuf,
    /// Resize the video box once during playback.
    pub resize: Option<LayoutChange>,
}

/// A new rendered size for the video box, applied before the given refresh.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutChange {
    pub at_frame: u32,
    pub width: f32,
    pub height: f32,
}

impl LayoutChange {
    fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=MAX_LAYOUT_PX).contains(&self.width)
                && (0.0..=MAX_LAYOUT_PX).contains(&self.height),
            "preview.resize width and height must be within [0, {MAX_LAYOUT_PX}]"
        );
        Ok(())
    }
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(16),
            max_frames: 120,
            output_dir: PathBuf::from("halo-out"),
            resize: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    pub halo: HaloOptions,
    pub preview: PreviewOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.halo.validate().context("invalid halo configuration")?;
        ensure!(
            self.preview.refresh_interval > Duration::ZERO,
            "preview.refresh-interval must be positive"
        );
        if let Some(change) = &self.preview.resize {
            change.validate()?;
        }
        Ok(self)
    }
}
