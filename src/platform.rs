//! Host capabilities the controller is driven by.
//!
//! A host (browser shim, compositor, test harness) hands the controller a
//! [`Platform`]; the controller never blocks or spins its own loop.

use crate::halo::HaloSurface;
use crate::source::SourceId;

/// Opaque handle of one requested "next frame" callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Opaque handle of a resize subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// One-shot display-refresh callbacks.
///
/// When the requested frame comes due the host calls
/// [`AmbilightController::on_frame`](crate::controller::AmbilightController::on_frame)
/// with the returned handle.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Geometry-change notifications for a source.
///
/// The host reports changes through
/// [`AmbilightController::on_resize`](crate::controller::AmbilightController::on_resize).
pub trait ResizeNotifier {
    fn subscribe(&mut self, source: SourceId) -> Subscription;
    fn unsubscribe(&mut self, subscription: Subscription);
}

/// Creates the glow surface for a new session.
pub trait SurfaceProvider {
    type Surface: HaloSurface;

    fn create_surface(&mut self) -> Self::Surface;
}

/// Everything a controller needs from its host.
pub trait Platform: FrameScheduler + ResizeNotifier + SurfaceProvider {}

impl<T> Platform for T where T: FrameScheduler + ResizeNotifier + SurfaceProvider {}
