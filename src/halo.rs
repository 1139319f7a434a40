//! The glow surface drawn around the displayed picture.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::color::Rgb;
use crate::geometry::Rect;
use crate::sampler::EdgeColors;

/// Edge of the picture a glow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Unit direction the glow projects towards, in layout coordinates.
    pub const fn outward(&self) -> (f32, f32) {
        match self {
            Edge::Top => (0.0, -1.0),
            Edge::Bottom => (0.0, 1.0),
            Edge::Left => (-1.0, 0.0),
            Edge::Right => (1.0, 0.0),
        }
    }
}

/// Shape parameters shared by all four glows.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GlowOptions {
    /// Distance the glow is pushed outwards from its edge.
    pub offset_px: f32,
    pub blur_px: f32,
    pub spread_px: f32,
}

impl Default for GlowOptions {
    fn default() -> Self {
        Self {
            offset_px: 60.0,
            blur_px: 100.0,
            spread_px: 60.0,
        }
    }
}

/// One directional glow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub edge: Edge,
    pub color: Rgb,
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub spread: f32,
}

/// Complete visual state of a shown halo.
#[derive(Debug, Clone, PartialEq)]
pub struct HaloStyle {
    pub rect: Rect,
    pub opacity: f32,
    pub glows: [Glow; 4],
    /// Stacking index; always one below the video.
    pub layer: i32,
    /// The halo never intercepts pointer input.
    pub pointer_events: bool,
}

impl HaloStyle {
    pub fn glow(&self, edge: Edge) -> &Glow {
        // glows are stored in Edge::ALL order
        &self.glows[edge as usize]
    }

    /// The four glows as a CSS `box-shadow` value.
    pub fn box_shadow(&self) -> String {
        let mut out = String::new();
        for (i, g) in self.glows.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(
                out,
                "{}px {}px {}px {}px {}",
                g.offset_x, g.offset_y, g.blur, g.spread, g.color
            );
        }
        out
    }
}

/// Platform glow surface (a DOM node, a compositor layer, a test recorder).
///
/// Releasing the surface is done by dropping it.
pub trait HaloSurface {
    fn show(&mut self, style: &HaloStyle);
    fn hide(&mut self);
}

/// Per-frame derived visual signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientState {
    pub edge_colors: EdgeColors,
    pub brightness: f32,
    pub opacity: f32,
}

/// Drives a [`HaloSurface`] from resolved geometry and ambient state.
#[derive(Debug)]
pub struct HaloRenderer<S> {
    surface: S,
    glow: GlowOptions,
    layer: i32,
    visible: bool,
}

impl<S: HaloSurface> HaloRenderer<S> {
    /// Wrap a freshly created surface; it starts hidden.
    pub fn new(mut surface: S, glow: GlowOptions, video_layer: i32) -> Self {
        surface.hide();
        Self {
            surface,
            glow,
            layer: video_layer.saturating_sub(1),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Overlay `picture` (the resolved displayed rectangle) and tint each
    /// glow with its edge color.
    pub fn render(&mut self, picture: Rect, state: &AmbientState) {
        let style = self.style_for(picture, state);
        self.surface.show(&style);
        self.visible = true;
    }

    /// Hide without releasing; showing again is cheap.
    pub fn hide(&mut self) {
        if self.visible {
            self.surface.hide();
            self.visible = false;
        }
    }

    pub fn style_for(&self, picture: Rect, state: &AmbientState) -> HaloStyle {
        let colors = &state.edge_colors;
        let glows = Edge::ALL.map(|edge| {
            let (dx, dy) = edge.outward();
            let color = match edge {
                Edge::Top => colors.top,
                Edge::Bottom => colors.bottom,
                Edge::Left => colors.left,
                Edge::Right => colors.right,
            };
            Glow {
                edge,
                color,
                offset_x: dx * self.glow.offset_px,
                offset_y: dy * self.glow.offset_px,
                blur: self.glow.blur_px,
                spread: self.glow.spread_px,
            }
        });
        HaloStyle {
            rect: picture,
            opacity: state.opacity,
            glows,
            layer: self.layer,
            pointer_events: false,
        }
    }
}
