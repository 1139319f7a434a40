//! Headless host: plays an image sequence as a video and writes the lit
//! result to PNG files.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, ensure};
use image::imageops::{FilterType, blur, overlay, resize};
use image::{GenericImage, Rgba, RgbaImage};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{LayoutChange, PreviewOptions};
use crate::controller::{AmbilightController, TickOutcome};
use crate::error::Error;
use crate::geometry::Rect;
use crate::halo::{HaloStyle, HaloSurface};
use crate::platform::{FrameHandle, FrameScheduler, ResizeNotifier, Subscription, SurfaceProvider};
use crate::source::{PlaybackState, ReadyState, SourceId, VideoSource};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Return `true` if `path` has an extension the frame loader can decode.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|e| *e == ext)
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    // the root itself may be a dot-dir (tempdirs)
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with('.'))
}

/// An ordered list of still images played back in a loop.
#[derive(Debug)]
pub struct SequenceSource {
    id: SourceId,
    frames: Vec<RgbaImage>,
    cursor: Cell<usize>,
    layout: Cell<Rect>,
    active: Cell<bool>,
}

impl SequenceSource {
    pub fn new(id: SourceId, frames: Vec<RgbaImage>, layout: Rect) -> Self {
        Self {
            id,
            frames,
            cursor: Cell::new(0),
            layout: Cell::new(layout),
            active: Cell::new(false),
        }
    }

    /// Load every image directly inside `dir`, sorted by file name.
    pub fn from_dir(id: SourceId, dir: &Path, layout: Rect) -> Result<Self> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
            let path = entry.path();
            if path.is_file() && is_supported_image(path) {
                paths.push(path.to_path_buf());
            }
        }
        ensure!(!paths.is_empty(), "no images found in {}", dir.display());

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let img = image::open(path)
                .with_context(|| format!("failed to decode {}", path.display()))?
                .to_rgba8();
            frames.push(img);
        }
        info!(count = frames.len(), dir = %dir.display(), "loaded frame sequence");
        Ok(Self::new(id, frames, layout))
    }

    pub fn advance(&self) {
        if !self.frames.is_empty() {
            self.cursor.set((self.cursor.get() + 1) % self.frames.len());
        }
    }

    pub fn current(&self) -> Option<&RgbaImage> {
        self.frames.get(self.cursor.get())
    }

    pub fn set_layout(&self, layout: Rect) {
        self.layout.set(layout);
    }
}

impl VideoSource for SequenceSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn intrinsic_size(&self) -> (u32, u32) {
        self.current().map_or((0, 0), RgbaImage::dimensions)
    }

    fn playback(&self) -> PlaybackState {
        PlaybackState::Playing
    }

    fn ready_state(&self) -> ReadyState {
        if self.frames.is_empty() {
            ReadyState::HaveNothing
        } else {
            ReadyState::HaveEnoughData
        }
    }

    fn bounding_rect(&self) -> Rect {
        self.layout.get()
    }

    fn draw_frame(&self, target: &mut RgbaImage) -> Result<(), Error> {
        let frame = self
            .current()
            .ok_or_else(|| Error::FrameRead("sequence is empty".into()))?;
        target
            .copy_from(frame, 0, 0)
            .map_err(|e| Error::FrameRead(e.to_string()))
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn mark_active(&self, layer: Option<i32>) {
        self.active.set(layer.is_some());
    }
}

/// Keeps the last style it was shown with.
#[derive(Debug, Default)]
pub struct RasterSurface {
    style: Option<HaloStyle>,
}

impl RasterSurface {
    pub fn style(&self) -> Option<&HaloStyle> {
        self.style.as_ref()
    }
}

impl HaloSurface for RasterSurface {
    fn show(&mut self, style: &HaloStyle) {
        self.style = Some(style.clone());
    }

    fn hide(&mut self) {
        self.style = None;
    }
}

/// Single-threaded scheduler whose frames come due when the driver polls.
#[derive(Debug, Default)]
pub struct PreviewPlatform {
    next_id: u64,
    pending: Option<FrameHandle>,
    subscriptions: HashMap<Subscription, SourceId>,
}

impl PreviewPlatform {
    /// Take the outstanding frame request, if any.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether anyone wants geometry changes of `source`.
    pub fn is_watching(&self, source: SourceId) -> bool {
        self.subscriptions.values().any(|s| *s == source)
    }

    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FrameScheduler for PreviewPlatform {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.bump());
        if let Some(old) = self.pending.replace(handle) {
            warn!(handle = old.0, "frame request replaced without cancel");
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

impl ResizeNotifier for PreviewPlatform {
    fn subscribe(&mut self, source: SourceId) -> Subscription {
        let sub = Subscription(self.bump());
        self.subscriptions.insert(sub, source);
        sub
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscriptions.remove(&subscription);
    }
}

impl SurfaceProvider for PreviewPlatform {
    type Surface = RasterSurface;

    fn create_surface(&mut self) -> RasterSurface {
        RasterSurface::default()
    }
}

/// Paint the halo and the picture it surrounds onto a canvas covering
/// `layout` plus `margin` pixels on every side.
pub fn compose(frame: &RgbaImage, style: &HaloStyle, layout: Rect, margin: u32) -> RgbaImage {
    let cw = (layout.width.max(1.0).round() as u32).saturating_add(margin.saturating_mul(2));
    let ch = (layout.height.max(1.0).round() as u32).saturating_add(margin.saturating_mul(2));
    let mut canvas = RgbaImage::from_pixel(cw, ch, Rgba([0, 0, 0, 255]));
    let origin = (layout.x - margin as f32, layout.y - margin as f32);
    let pic = style.rect;

    for glow in &style.glows {
        let x0 = pic.x - origin.0 + glow.offset_x - glow.spread;
        let y0 = pic.y - origin.1 + glow.offset_y - glow.spread;
        let x1 = x0 + pic.width + glow.spread * 2.0;
        let y1 = y0 + pic.height + glow.spread * 2.0;
        let alpha = style.opacity.clamp(0.0, 1.0);
        let [r, g, b] = glow.color.0;
        for y in (y0.max(0.0) as u32)..(y1.clamp(0.0, ch as f32) as u32) {
            for x in (x0.max(0.0) as u32)..(x1.clamp(0.0, cw as f32) as u32) {
                let px = canvas.get_pixel_mut(x, y);
                for (c, v) in [r, g, b].into_iter().enumerate() {
                    let mixed = px[c] as f32 * (1.0 - alpha) + v as f32 * alpha;
                    px[c] = px[c].max(mixed.round() as u8);
                }
            }
        }
    }
    let sigma = style.glows.iter().map(|g| g.blur).fold(0.0_f32, f32::max) / 2.0;
    if sigma > 0.0 {
        canvas = blur(&canvas, sigma);
    }

    let pw = pic.width.round().max(1.0) as u32;
    let ph = pic.height.round().max(1.0) as u32;
    let scaled = resize(frame, pw, ph, FilterType::Triangle);
    overlay(
        &mut canvas,
        &scaled,
        (pic.x - origin.0).round() as i64,
        (pic.y - origin.1).round() as i64,
    );
    canvas
}

fn apply_resize(
    controller: &mut AmbilightController<PreviewPlatform>,
    source: &SequenceSource,
    change: LayoutChange,
) {
    let old = source.bounding_rect();
    source.set_layout(Rect::new(old.x, old.y, change.width, change.height));
    info!(width = change.width, height = change.height, "video box resized");
    if controller.platform().is_watching(source.id()) {
        controller.on_resize(source.id());
    }
}

/// Drive `controller` at the configured refresh rate until `max-frames`
/// callbacks have fired or `cancel` triggers. Returns the number of images
/// written.
pub async fn run(
    controller: &mut AmbilightController<PreviewPlatform>,
    source: Rc<SequenceSource>,
    options: &PreviewOptions,
    margin: u32,
    cancel: CancellationToken,
) -> Result<u32> {
    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("failed to create {}", options.output_dir.display()))?;
    let as_dyn: Rc<dyn VideoSource> = source.clone();
    controller.start(&as_dyn);

    let mut ticker = interval(options.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut written = 0u32;

    for frame_no in 0..options.max_frames {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if let Some(change) = options.resize.filter(|c| c.at_frame == frame_no) {
            apply_resize(controller, &source, change);
        }
        let Some(handle) = controller.platform_mut().take_due() else {
            debug!("no frame requested; session ended");
            break;
        };
        match controller.on_frame(handle) {
            Some(TickOutcome::Rendered(_)) => {
                let style = controller.halo_surface().and_then(RasterSurface::style);
                if let (Some(style), Some(frame)) = (style, source.current()) {
                    let out = compose(frame, style, source.bounding_rect(), margin);
                    let path = options.output_dir.join(format!("halo-{frame_no:05}.png"));
                    out.save(&path)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    written += 1;
                }
            }
            Some(TickOutcome::Stopped) => break,
            Some(TickOutcome::Hidden(reason)) => debug!(?reason, "halo hidden"),
            None => {}
        }
        source.advance();
    }

    controller.stop();
    info!(written, "preview finished");
    Ok(written)
}
