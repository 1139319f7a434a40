//! Session lifecycle and the per-refresh sampling loop.
//!
//! The controller is cooperative: it never loops on its own. Each tick ends by
//! requesting exactly one follow-up frame from the [`Platform`], and the host
//! calls back into [`AmbilightController::on_frame`] when that frame is due.
//! At most one frame request is outstanding at any time.

use std::rc::{Rc, Weak};

use image::RgbaImage;
use tracing::{debug, error, info, trace};

use crate::brightness::brightness;
use crate::config::HaloOptions;
use crate::error::Error;
use crate::geometry::resolve_geometry;
use crate::halo::{AmbientState, HaloRenderer, HaloSurface};
use crate::platform::{FrameHandle, Platform, Subscription};
use crate::sampler::{EdgeStrips, fit_buffer};
use crate::source::{PlaybackState, SourceId, VideoSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No session.
    Idle,
    /// Session bound, first tick not completed yet.
    Starting,
    /// At least one tick completed.
    Running,
}

/// Why a tick hid the halo instead of sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    /// The source was dropped by its owner.
    SourceGone,
    Paused,
    Ended,
    NotReady,
    /// The rendered box has zero width or height.
    ZeroArea,
    /// Intrinsic size still unknown (metadata not loaded).
    NoFrame,
}

/// Result of one executed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Rendered(AmbientState),
    Hidden(HideReason),
    /// Sampling failed and the session was torn down.
    Stopped,
}

struct Session<S> {
    source: Weak<dyn VideoSource>,
    source_id: SourceId,
    halo: HaloRenderer<S>,
    buffer: RgbaImage,
    resize: Subscription,
    scheduled: Option<FrameHandle>,
    ticked: bool,
}

impl<S: HaloSurface> Session<S> {
    fn hidden(&mut self, reason: HideReason) -> TickOutcome {
        trace!(source = self.source_id.0, ?reason, "halo hidden");
        self.halo.hide();
        TickOutcome::Hidden(reason)
    }

    fn tick(&mut self, options: &HaloOptions) -> Result<TickOutcome, Error> {
        let Some(source) = self.source.upgrade() else {
            return Ok(self.hidden(HideReason::SourceGone));
        };
        match source.playback() {
            PlaybackState::Playing => {}
            PlaybackState::Paused => return Ok(self.hidden(HideReason::Paused)),
            PlaybackState::Ended => return Ok(self.hidden(HideReason::Ended)),
        }
        if source.ready_state() < options.min_ready_state {
            return Ok(self.hidden(HideReason::NotReady));
        }
        let layout = source.bounding_rect();
        if !layout.has_area() {
            return Ok(self.hidden(HideReason::ZeroArea));
        }
        let (vw, vh) = source.intrinsic_size();
        let Some(geometry) = resolve_geometry((vw, vh), &layout) else {
            return Ok(self.hidden(HideReason::NoFrame));
        };

        fit_buffer(&mut self.buffer, vw, vh);
        source.draw_frame(&mut self.buffer)?;
        // edges come from the full intrinsic frame, bars included
        let Some(strips) = EdgeStrips::extract(&self.buffer, options.sample_depth) else {
            return Ok(self.hidden(HideReason::NoFrame));
        };
        let brightness = brightness(&self.buffer);
        let state = AmbientState {
            edge_colors: strips.average(),
            brightness,
            opacity: options.opacity_range().opacity_for(brightness),
        };
        self.halo.render(geometry.placed_in(&layout), &state);
        Ok(TickOutcome::Rendered(state))
    }
}

/// Binds at most one [`VideoSource`] at a time and keeps its halo in sync.
pub struct AmbilightController<P: Platform> {
    platform: P,
    options: HaloOptions,
    session: Option<Session<P::Surface>>,
}

impl<P: Platform> AmbilightController<P> {
    pub fn new(platform: P, options: HaloOptions) -> Self {
        Self {
            platform,
            options,
            session: None,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn options(&self) -> &HaloOptions {
        &self.options
    }

    pub fn state(&self) -> ControllerState {
        match &self.session {
            None => ControllerState::Idle,
            Some(s) if s.ticked => ControllerState::Running,
            Some(_) => ControllerState::Starting,
        }
    }

    pub fn active_source(&self) -> Option<SourceId> {
        self.session.as_ref().map(|s| s.source_id)
    }

    /// The frame request this controller is waiting on, if any.
    pub fn pending_tick(&self) -> Option<FrameHandle> {
        self.session.as_ref().and_then(|s| s.scheduled)
    }

    pub fn halo_surface(&self) -> Option<&P::Surface> {
        self.session.as_ref().map(|s| s.halo.surface())
    }

    pub fn halo_visible(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.halo.is_visible())
    }

    /// Bind a session to `source` and schedule its first tick.
    ///
    /// No-op when `source` already has an active session; any other session
    /// is torn down first.
    pub fn start(&mut self, source: &Rc<dyn VideoSource>) {
        let id = source.id();
        if self.active_source() == Some(id) || source.is_active() {
            trace!(source = id.0, "source already lit");
            return;
        }
        self.stop();

        info!(source = id.0, "starting ambilight");
        source.mark_active(Some(self.options.video_layer));
        let halo = HaloRenderer::new(
            self.platform.create_surface(),
            self.options.glow,
            self.options.video_layer,
        );
        let resize = self.platform.subscribe(id);
        let scheduled = self.platform.request_frame();
        self.session = Some(Session {
            source: Rc::downgrade(source),
            source_id: id,
            halo,
            buffer: RgbaImage::new(0, 0),
            resize,
            scheduled: Some(scheduled),
            ticked: false,
        });
    }

    /// Tear down the active session. Idempotent.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(handle) = session.scheduled.take() {
            self.platform.cancel_frame(handle);
        }
        self.platform.unsubscribe(session.resize);
        if let Some(source) = session.source.upgrade() {
            source.mark_active(None);
        }
        // dropping the session releases the halo surface and the offscreen buffer
        drop(session);
        info!("ambilight stopped");
    }

    /// Host callback for a due frame request.
    ///
    /// Returns `None` when `handle` is not the outstanding request (cancelled,
    /// superseded, or no session); such callbacks are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<TickOutcome> {
        let Some(session) = self.session.as_mut() else {
            trace!(handle = handle.0, "frame callback without session");
            return None;
        };
        if session.scheduled != Some(handle) {
            trace!(handle = handle.0, "ignoring stale frame callback");
            return None;
        }
        session.scheduled = None;

        let outcome = match session.tick(&self.options) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(source = session.source_id.0, %err, "ambilight sampling failed");
                self.stop();
                return Some(TickOutcome::Stopped);
            }
        };
        session.ticked = true;
        session.scheduled = Some(self.platform.request_frame());
        Some(outcome)
    }

    /// Host callback for a geometry change of `source`.
    ///
    /// Cancels the outstanding tick and requests a fresh one so the halo
    /// follows the new layout on the very next refresh.
    pub fn on_resize(&mut self, source: SourceId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.source_id != source {
            return;
        }
        if let Some(handle) = session.scheduled.take() {
            self.platform.cancel_frame(handle);
        }
        debug!(source = source.0, "layout changed, rescheduling tick");
        session.scheduled = Some(self.platform.request_frame());
    }
}

impl<P: Platform> Drop for AmbilightController<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
