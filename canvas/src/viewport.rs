//! Viewport: pan/zoom state and the mapping between screen and board space.
//!
//! Board-to-screen is `screen = board * scale + offset`; screen-to-board is
//! the inverse. `scale` always stays within [`MIN_SCALE`, `MAX_SCALE`].

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{MAX_SCALE, MIN_SCALE, ZOOM_STEP};

/// A point in either screen or board space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of an item, in board units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in screen pixels, used to place editor overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Direction of a single zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Map a wheel delta to a zoom direction. Scrolling down zooms out;
    /// a zero delta yields `None`.
    #[must_use]
    pub fn from_wheel(dy: f64) -> Option<Self> {
        if dy > 0.0 {
            Some(Self::Out)
        } else if dy < 0.0 {
            Some(Self::In)
        } else {
            None
        }
    }
}

/// Pan/zoom state of the infinite board.
///
/// `offset_x` / `offset_y` are in screen pixels; `scale` is the zoom factor
/// (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    /// Convert a screen-space point to board coordinates.
    #[must_use]
    pub fn to_board(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.offset_x) / self.scale,
            y: (screen.y - self.offset_y) / self.scale,
        }
    }

    /// Convert a board-space point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, board: Point) -> Point {
        Point {
            x: board.x * self.scale + self.offset_x,
            y: board.y * self.scale + self.offset_y,
        }
    }

    /// Convert a screen-space distance (pixels) to a board-space distance.
    #[must_use]
    pub fn screen_dist_to_board(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Screen rectangle covered by a board-space box.
    #[must_use]
    pub fn rect_to_screen(&self, position: Point, size: Size) -> ScreenRect {
        let top_left = self.to_screen(position);
        ScreenRect {
            left: top_left.x,
            top: top_left.y,
            width: size.width * self.scale,
            height: size.height * self.scale,
        }
    }

    /// Board point at the center of a viewing surface of the given pixel size.
    #[must_use]
    pub fn center_board(&self, width_px: f64, height_px: f64) -> Point {
        self.to_board(Point::new(width_px * 0.5, height_px * 0.5))
    }

    /// Translate the view by a screen-space delta. Pan is not scaled by zoom.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Zoom one step in `direction`, keeping the board point under `pointer`
    /// fixed on screen. Returns `false` when already at the clamp boundary.
    pub fn zoom_at(&mut self, pointer: Point, direction: ZoomDirection) -> bool {
        let target = match direction {
            ZoomDirection::In => self.scale * ZOOM_STEP,
            ZoomDirection::Out => self.scale / ZOOM_STEP,
        };
        self.zoom_to(pointer, target)
    }

    /// Set the zoom factor (clamped), keeping the board point under `pointer`
    /// fixed on screen. Returns `false` if the clamped scale is unchanged.
    pub fn zoom_to(&mut self, pointer: Point, scale: f64) -> bool {
        let new_scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.to_board(pointer);
        self.scale = new_scale;
        self.offset_x = pointer.x - anchor.x * new_scale;
        self.offset_y = pointer.y - anchor.y * new_scale;
        true
    }
}
