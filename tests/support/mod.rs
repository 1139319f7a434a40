#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use ambient_halo::Error;
use ambient_halo::geometry::Rect;
use ambient_halo::halo::{HaloStyle, HaloSurface};
use ambient_halo::platform::{
    FrameHandle, FrameScheduler, ResizeNotifier, Subscription, SurfaceProvider,
};
use ambient_halo::source::{PlaybackState, ReadyState, SourceId, VideoSource};
use image::{Rgba, RgbaImage};

pub struct FakeSource {
    pub id: SourceId,
    pub size: Cell<(u32, u32)>,
    pub playback: Cell<PlaybackState>,
    pub ready: Cell<ReadyState>,
    pub rect: Cell<Rect>,
    pub fill: Cell<[u8; 3]>,
    pub tainted: Cell<bool>,
    pub layer: Cell<Option<i32>>,
    pub draws: Cell<usize>,
}

impl FakeSource {
    pub fn playing(id: u64, size: (u32, u32), rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            id: SourceId(id),
            size: Cell::new(size),
            playback: Cell::new(PlaybackState::Playing),
            ready: Cell::new(ReadyState::HaveEnoughData),
            rect: Cell::new(rect),
            fill: Cell::new([255, 255, 255]),
            tainted: Cell::new(false),
            layer: Cell::new(None),
            draws: Cell::new(0),
        })
    }

    pub fn as_dyn(self: &Rc<Self>) -> Rc<dyn VideoSource> {
        self.clone()
    }
}

impl VideoSource for FakeSource {
    fn id(&self) -> SourceId {
        self.id
    }
    fn intrinsic_size(&self) -> (u32, u32) {
        self.size.get()
    }
    fn playback(&self) -> PlaybackState {
        self.playback.get()
    }
    fn ready_state(&self) -> ReadyState {
        self.ready.get()
    }
    fn bounding_rect(&self) -> Rect {
        self.rect.get()
    }
    fn draw_frame(&self, target: &mut RgbaImage) -> Result<(), Error> {
        self.draws.set(self.draws.get() + 1);
        if self.tainted.get() {
            return Err(Error::FrameRead("tainted canvas".into()));
        }
        assert_eq!(target.dimensions(), self.size.get(), "buffer sized to intrinsic dims");
        let [r, g, b] = self.fill.get();
        for px in target.pixels_mut() {
            *px = Rgba([r, g, b, 255]);
        }
        Ok(())
    }
    fn is_active(&self) -> bool {
        self.layer.get().is_some()
    }
    fn mark_active(&self, layer: Option<i32>) {
        self.layer.set(layer);
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub created: usize,
    pub dropped: usize,
    pub shows: Vec<HaloStyle>,
    pub hides: usize,
    pub visible: bool,
}

pub struct FakeSurface(Rc<RefCell<SurfaceLog>>);

impl HaloSurface for FakeSurface {
    fn show(&mut self, style: &HaloStyle) {
        let mut log = self.0.borrow_mut();
        log.shows.push(style.clone());
        log.visible = true;
    }
    fn hide(&mut self) {
        let mut log = self.0.borrow_mut();
        log.hides += 1;
        log.visible = false;
    }
}

impl Drop for FakeSurface {
    fn drop(&mut self) {
        self.0.borrow_mut().dropped += 1;
    }
}

/// Records every scheduling call; frames are fired by the test.
#[derive(Default)]
pub struct FakePlatform {
    next_id: u64,
    pub pending: Vec<FrameHandle>,
    pub cancelled: Vec<FrameHandle>,
    pub subscriptions: HashSet<Subscription>,
    pub subscribed_sources: Vec<SourceId>,
    pub surfaces: Rc<RefCell<SurfaceLog>>,
}

impl FakePlatform {
    pub fn fire_next(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for FakePlatform {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let h = FrameHandle(self.next_id);
        self.pending.push(h);
        h
    }
    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}

impl ResizeNotifier for FakePlatform {
    fn subscribe(&mut self, source: SourceId) -> Subscription {
        self.next_id += 1;
        let sub = Subscription(self.next_id);
        self.subscriptions.insert(sub);
        self.subscribed_sources.push(source);
        sub
    }
    fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscriptions.remove(&subscription);
    }
}

impl SurfaceProvider for FakePlatform {
    type Surface = FakeSurface;

    fn create_surface(&mut self) -> FakeSurface {
        self.surfaces.borrow_mut().created += 1;
        FakeSurface(self.surfaces.clone())
    }
}
