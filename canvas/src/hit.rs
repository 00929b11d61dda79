#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ItemId, ItemStore, ResizeCorner};
use crate::viewport::{Point, Viewport};

/// Which part of an item was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeCorner),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub item_id: ItemId,
    pub part: HitPart,
}

/// Find what is under `board_pt`.
///
/// Handles of the selected item win over any body, so a handle overhanging a
/// neighbouring item stays grabbable. Otherwise the topmost visible body wins.
/// Handle slop is constant in screen pixels regardless of zoom.
#[must_use]
pub fn hit_test(board_pt: Point, store: &ItemStore, viewport: &Viewport, selected: Option<ItemId>) -> Option<Hit> {
    if let Some(id) = selected {
        if let Some(corner) = handle_at(board_pt, store, viewport, id) {
            return Some(Hit { item_id: id, part: HitPart::ResizeHandle(corner) });
        }
    }

    store
        .sorted_items()
        .into_iter()
        .rev()
        .find(|item| item.contains(board_pt))
        .map(|item| Hit { item_id: item.id, part: HitPart::Body })
}

fn handle_at(board_pt: Point, store: &ItemStore, viewport: &Viewport, id: ItemId) -> Option<ResizeCorner> {
    let item = store.get(&id)?;
    if item.deleted || !item.kind.is_resizable() {
        return None;
    }
    let radius = viewport.screen_dist_to_board(HANDLE_RADIUS_PX);
    ResizeCorner::ALL.into_iter().find(|corner| {
        let anchor = corner.anchor(item);
        let dx = board_pt.x - anchor.x;
        let dy = board_pt.y - anchor.y;
        dx * dx + dy * dy <= radius * radius
    })
}
