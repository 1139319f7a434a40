//! Placement of the visible video picture inside its layout box.

/// Axis-aligned rectangle in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// The sub-rectangle of a layout box actually covered by video pixels.
///
/// Offsets are relative to the top-left corner of the layout box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameGeometry {
    pub displayed_width: f32,
    pub displayed_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl FrameGeometry {
    /// Absolute rectangle of the picture once placed inside `layout`.
    pub fn placed_in(&self, layout: &Rect) -> Rect {
        Rect::new(
            layout.x + self.offset_x,
            layout.y + self.offset_y,
            self.displayed_width,
            self.displayed_height,
        )
    }
}

/// Resolve the letterbox/pillarbox-corrected picture rectangle.
///
/// Returns `None` when either the layout box or the intrinsic frame is
/// degenerate; callers treat that as "not visible".
pub fn resolve_geometry(intrinsic: (u32, u32), layout: &Rect) -> Option<FrameGeometry> {
    let (vw, vh) = intrinsic;
    if !layout.has_area() || vw == 0 || vh == 0 {
        return None;
    }
    let (rw, rh) = (layout.width, layout.height);
    let video_aspect = vw as f32 / vh as f32;
    let box_aspect = rw / rh;

    let geometry = if video_aspect > box_aspect {
        // letterbox: full width, bars above and below
        let displayed_height = rw / video_aspect;
        FrameGeometry {
            displayed_width: rw,
            displayed_height,
            offset_x: 0.0,
            offset_y: (rh - displayed_height) / 2.0,
        }
    } else if video_aspect < box_aspect {
        // pillarbox: full height, bars left and right
        let displayed_width = rh * video_aspect;
        FrameGeometry {
            displayed_width,
            displayed_height: rh,
            offset_x: (rw - displayed_width) / 2.0,
            offset_y: 0.0,
        }
    } else {
        FrameGeometry {
            displayed_width: rw,
            displayed_height: rh,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    };
    Some(geometry)
}
