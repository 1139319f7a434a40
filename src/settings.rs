//! Per-site settings as stored by the extension, and the glue that maps them
//! onto a controller.

use std::rc::Rc;

use serde::Deserialize;
use tracing::debug;

use crate::controller::AmbilightController;
use crate::platform::Platform;
use crate::source::{ReadyState, VideoSource};

/// Videos narrower than this are never lit (thumbnails, previews, ads).
pub const MIN_CANDIDATE_WIDTH: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Body,
    Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub is_site_enabled: bool,
    pub is_ambilight_enabled: bool,
    pub target_type: TargetType,
    pub target_value: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_site_enabled: true,
            is_ambilight_enabled: false,
            target_type: TargetType::Body,
            target_value: "body".to_string(),
        }
    }
}

/// Pick the largest rendered candidate that has a decoded frame and is wide
/// enough to be worth lighting.
pub fn pick_candidate(candidates: &[Rc<dyn VideoSource>]) -> Option<&Rc<dyn VideoSource>> {
    candidates
        .iter()
        .filter(|v| {
            v.ready_state() >= ReadyState::HaveCurrentData
                && v.intrinsic_size().0 > MIN_CANDIDATE_WIDTH
        })
        .max_by(|a, b| rendered_area(a).total_cmp(&rendered_area(b)))
}

fn rendered_area(video: &Rc<dyn VideoSource>) -> f32 {
    let r = video.bounding_rect();
    r.width * r.height
}

/// Start, keep, or stop the halo so it matches `settings` and the videos
/// currently on the page.
pub fn sync_with_settings<P: Platform>(
    controller: &mut AmbilightController<P>,
    settings: &Settings,
    candidates: &[Rc<dyn VideoSource>],
) {
    if !settings.is_ambilight_enabled {
        controller.stop();
        return;
    }
    match pick_candidate(candidates) {
        Some(video) if !video.is_active() => controller.start(video),
        Some(_) => {}
        None if controller.active_source().is_some() => {
            debug!("no qualifying video left");
            controller.stop();
        }
        None => {}
    }
}
