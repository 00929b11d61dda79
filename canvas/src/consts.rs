//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_SCALE: f64 = 0.25;

/// Largest allowed zoom factor.
pub const MAX_SCALE: f64 = 3.0;

/// Multiplicative zoom step applied per wheel notch (5%).
pub const ZOOM_STEP: f64 = 1.05;

// ── Items ───────────────────────────────────────────────────────

/// Resize floor for item width, in board units.
pub const MIN_ITEM_WIDTH: f64 = 50.0;

/// Resize floor for item height, in board units.
pub const MIN_ITEM_HEIGHT: f64 = 30.0;

/// Board-space offset applied to a duplicated item.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Default stroke width for freehand drawing, in board units.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Fewest points a freehand stroke needs to be kept.
pub const MIN_STROKE_POINTS: usize = 2;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;
