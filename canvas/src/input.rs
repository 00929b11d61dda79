//! Input model: tools, modifier keys, pointer targets, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `PointerTarget` is what the renderer reports under the pointer.
//! `BoardSession` holds the per-board-view UI state (selection, tool, edit
//! draft). `GestureState` is the active gesture between pointer-down and
//! pointer-up, carrying the context needed to compute cumulative deltas and
//! emit one final mutation on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde_json::Value;

use crate::doc::{Item, ItemId, ResizeCorner};
use crate::hit::{Hit, HitPart};
use crate::viewport::{Point, Size};

/// Which tool is currently active. Owned by the toolbar; the engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move, and resize items (default).
    #[default]
    Select,
    /// Freehand pen.
    Draw,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// What lies under the pointer, as classified by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty board surface.
    Canvas,
    /// An item's body.
    Item(ItemId),
    /// One of an item's resize handles.
    Handle(ItemId, ResizeCorner),
    /// The renderer could not tell. Treated like empty canvas.
    Unclassified,
}

impl PointerTarget {
    /// Target for a hit-test result; a miss is empty canvas.
    #[must_use]
    pub fn from_hit(hit: Option<Hit>) -> Self {
        match hit {
            None => Self::Canvas,
            Some(Hit { item_id, part: HitPart::Body }) => Self::Item(item_id),
            Some(Hit { item_id, part: HitPart::ResizeHandle(corner) }) => Self::Handle(item_id, corner),
        }
    }
}

/// The overlay editor's in-progress buffer.
#[derive(Debug, Clone)]
pub struct EditDraft {
    /// Item being edited.
    pub id: ItemId,
    /// Accumulated data patch, not yet applied to the store.
    pub patch: Value,
}

/// Per-board-view UI state shared between the gesture controller and its
/// collaborators. Created with the board view and dropped with it.
#[derive(Debug, Clone, Default)]
pub struct BoardSession {
    /// Currently active tool.
    pub tool: Tool,
    /// The currently selected item, if any.
    pub selected_id: Option<ItemId>,
    /// The open overlay editor's draft, if any.
    pub edit: Option<EditDraft>,
}

impl BoardSession {
    /// Point every reference at `old` to `new`.
    pub fn remap(&mut self, old: &ItemId, new: ItemId) {
        if self.selected_id.as_ref() == Some(old) {
            self.selected_id = Some(new);
        }
        if let Some(edit) = self.edit.as_mut() {
            if edit.id == *old {
                edit.id = new;
            }
        }
    }
}

/// Internal state for the gesture state machine.
///
/// Each active variant carries the context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the empty canvas to pan the view.
    Panning {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving an item across the board.
    DraggingItem {
        id: ItemId,
        /// Screen position of the pointer-down.
        start_screen: Point,
        /// Snapshot taken at pointer-down; becomes the history pre-image.
        pre_image: Box<Item>,
        /// Whether the item has actually moved during this gesture.
        moved: bool,
    },
    /// Resizing an item by one of its handles.
    ResizingItem {
        id: ItemId,
        corner: ResizeCorner,
        /// Screen position of the pointer-down.
        start_screen: Point,
        /// Size at pointer-down; every move resizes from this.
        orig_size: Size,
        /// Snapshot taken at pointer-down; becomes the history pre-image.
        pre_image: Box<Item>,
        /// Whether the size has actually changed during this gesture.
        resized: bool,
    },
    /// Drawing a freehand stroke.
    FreehandDrawing {
        /// Board-space points visited so far.
        points: Vec<Point>,
    },
    /// An overlay editor is open; canvas gestures are suppressed.
    Editing {
        id: ItemId,
    },
}

impl GestureState {
    /// Whether a pointer session is currently in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Panning { .. } | Self::DraggingItem { .. } | Self::ResizingItem { .. } | Self::FreehandDrawing { .. }
        )
    }

    /// Point the gesture at `new` if it targets `old`.
    pub fn remap(&mut self, old: &ItemId, new: ItemId) {
        match self {
            Self::DraggingItem { id, pre_image, .. } | Self::ResizingItem { id, pre_image, .. } => {
                if id == old {
                    *id = new;
                    pre_image.id = new;
                }
            }
            Self::Editing { id } => {
                if id == old {
                    *id = new;
                }
            }
            Self::Idle | Self::Panning { .. } | Self::FreehandDrawing { .. } => {}
        }
    }
}
