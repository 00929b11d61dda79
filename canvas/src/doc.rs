//! Document model: board items and the in-memory item store.
//!
//! This module defines what is on the board (`Item`, `ItemId`), how an item's
//! size responds to a resize handle (`ResizeCorner`), and the store that owns
//! every live item (`ItemStore`).
//!
//! Items are never physically removed by user actions: deletion sets a
//! tombstone flag so undo can bring the item back without a refetch. Every
//! mutation targeting an id that is not present is a silent no-op that
//! returns `false`; callers race against deletes and undos routinely.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::consts::{MIN_ITEM_HEIGHT, MIN_ITEM_WIDTH};
use crate::kind::ItemKind;
use crate::viewport::{Point, Size};

/// Identity of a board item.
///
/// Items created locally carry a `Pending` id until the persistence service
/// confirms them and assigns a `Server` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemId {
    /// Server-assigned identity.
    Server(i64),
    /// Temporary identity for an optimistic, not yet confirmed item.
    Pending(Uuid),
}

impl ItemId {
    /// Allocate a fresh temporary id.
    #[must_use]
    pub fn new_pending() -> Self {
        Self::Pending(Uuid::new_v4())
    }

    /// The server id, if this item has been confirmed.
    #[must_use]
    pub fn server(self) -> Option<i64> {
        match self {
            Self::Server(id) => Some(id),
            Self::Pending(_) => None,
        }
    }

    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{id}"),
            Self::Pending(uuid) => write!(f, "pending:{uuid}"),
        }
    }
}

/// Which handle of an item is being dragged to resize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCorner {
    /// Bottom-right corner: changes width and height.
    BottomRight,
    /// Right edge: changes width only.
    Right,
    /// Bottom edge: changes height only.
    Bottom,
}

impl ResizeCorner {
    /// All handles, in hit-test priority order.
    pub const ALL: [ResizeCorner; 3] = [Self::BottomRight, Self::Right, Self::Bottom];

    /// Size after dragging this handle by `delta` (board units) from `base`,
    /// clamped to the resize floor.
    #[must_use]
    pub fn apply(self, base: Size, delta: Point) -> Size {
        let mut size = base;
        if matches!(self, Self::BottomRight | Self::Right) {
            size.width = (base.width + delta.x).max(MIN_ITEM_WIDTH);
        }
        if matches!(self, Self::BottomRight | Self::Bottom) {
            size.height = (base.height + delta.y).max(MIN_ITEM_HEIGHT);
        }
        size
    }

    /// Board-space location of this handle on an item.
    #[must_use]
    pub fn anchor(self, item: &Item) -> Point {
        let right = item.x + item.width;
        let bottom = item.y + item.height;
        match self {
            Self::BottomRight => Point::new(right, bottom),
            Self::Right => Point::new(right, item.y + item.height * 0.5),
            Self::Bottom => Point::new(item.x + item.width * 0.5, bottom),
        }
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::BottomRight => "nwse-resize",
            Self::Right => "ew-resize",
            Self::Bottom => "ns-resize",
        }
    }
}

/// A board item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Left edge in board coordinates.
    pub x: f64,
    /// Top edge in board coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Paint and hit-test order; higher is on top.
    pub z_index: i64,
    /// Kind-specific payload. Always a JSON object.
    pub data: Value,
    /// Tombstone flag. Deleted items are hidden but kept for undo.
    pub deleted: bool,
    /// When the item was soft-deleted locally, if it is.
    pub deleted_at: Option<OffsetDateTime>,
}

impl Item {
    /// Build an item of `kind` at `position` with the kind's default size and data.
    #[must_use]
    pub fn new(id: ItemId, kind: ItemKind, position: Point) -> Self {
        let size = kind.spec().default_size;
        Self {
            id,
            kind,
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
            z_index: 0,
            data: kind.default_data(),
            deleted: false,
            deleted_at: None,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether `board_pt` falls inside the item's bounding box.
    #[must_use]
    pub fn contains(&self, board_pt: Point) -> bool {
        board_pt.x >= self.x
            && board_pt.x <= self.x + self.width
            && board_pt.y >= self.y
            && board_pt.y <= self.y + self.height
    }

    /// Raise width and height to the resize floor.
    fn clamp_size(&mut self) {
        self.width = self.width.max(MIN_ITEM_WIDTH);
        self.height = self.height.max(MIN_ITEM_HEIGHT);
    }

    /// Force `data` to be an object, replacing anything else with `{}`.
    fn normalize_data(&mut self) {
        if !self.data.is_object() {
            self.data = Value::Object(serde_json::Map::new());
        }
    }
}

/// Shallow-merge `patch` into `target`. Null values remove keys. Returns
/// whether anything changed.
fn merge_object(target: &mut Value, patch: &Value) -> bool {
    let Some(incoming) = patch.as_object() else {
        return false;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    let Some(existing) = target.as_object_mut() else {
        return false;
    };
    let mut changed = false;
    for (k, v) in incoming {
        if v.is_null() {
            changed |= existing.remove(k).is_some();
        } else if existing.get(k) != Some(v) {
            existing.insert(k.clone(), v.clone());
            changed = true;
        }
    }
    changed
}

/// In-memory store of board items, kept in paint order.
pub struct ItemStore {
    items: HashMap<ItemId, Item>,
    order: Vec<ItemId>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { items: HashMap::new(), order: Vec::new() }
    }

    /// Build a pending item of `kind` at `position`, insert it on top, and
    /// return a copy for optimistic display and persistence.
    pub fn create(&mut self, kind: ItemKind, position: Point) -> Item {
        let mut item = Item::new(ItemId::new_pending(), kind, position);
        item.z_index = self.next_z_index();
        self.insert(item.clone());
        item
    }

    /// Insert or replace an item. A replaced item keeps its paint position.
    pub fn insert(&mut self, mut item: Item) {
        item.clamp_size();
        item.normalize_data();
        if !self.items.contains_key(&item.id) {
            self.order.push(item.id);
        }
        self.items.insert(item.id, item);
    }

    /// Replace all items with a full snapshot, in the order given.
    pub fn load_snapshot(&mut self, items: Vec<Item>) {
        self.items.clear();
        self.order.clear();
        for item in items {
            self.insert(item);
        }
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Merge `patch` into the item's `data`. Returns `false` if the item is
    /// missing or nothing changed.
    pub fn patch_data(&mut self, id: &ItemId, patch: &Value) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        merge_object(&mut item.data, patch)
    }

    /// Set the item's top-left position.
    pub fn move_item(&mut self, id: &ItemId, x: f64, y: f64) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        item.x = x;
        item.y = y;
        true
    }

    /// Drag `corner` by `delta` board units from the item's current size.
    pub fn resize(&mut self, id: &ItemId, corner: ResizeCorner, delta: Point) -> bool {
        let Some(base) = self.items.get(id).map(Item::size) else {
            return false;
        };
        self.resize_from(id, corner, base, delta)
    }

    /// Set the size to `base` dragged by `delta` at `corner`. Gestures use
    /// this with the size captured at gesture start so deltas never compound.
    pub fn resize_from(&mut self, id: &ItemId, corner: ResizeCorner, base: Size, delta: Point) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        let size = corner.apply(base, delta);
        item.width = size.width;
        item.height = size.height;
        true
    }

    /// Tombstone the item. Returns `false` if missing or already deleted.
    pub fn soft_delete(&mut self, id: &ItemId) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if item.deleted {
            return false;
        }
        item.deleted = true;
        item.deleted_at = Some(OffsetDateTime::now_utc());
        true
    }

    /// Clear the tombstone. Returns `false` if missing or not deleted.
    pub fn restore(&mut self, id: &ItemId) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        if !item.deleted {
            return false;
        }
        item.deleted = false;
        item.deleted_at = None;
        true
    }

    /// Overwrite geometry, z-order, and data from `image`, keeping the
    /// item's current tombstone state.
    pub fn overwrite(&mut self, image: &Item) -> bool {
        let Some(item) = self.items.get_mut(&image.id) else {
            return false;
        };
        item.x = image.x;
        item.y = image.y;
        item.width = image.width.max(MIN_ITEM_WIDTH);
        item.height = image.height.max(MIN_ITEM_HEIGHT);
        item.z_index = image.z_index;
        item.data = image.data.clone();
        item.normalize_data();
        true
    }

    /// Re-key a pending item under its server id. With `keep_local` the
    /// local fields survive (the item was edited while the create was in
    /// flight); otherwise the server's fields replace them.
    pub fn confirm(&mut self, pending: &ItemId, confirmed: Item, keep_local: bool) -> bool {
        let Some(mut local) = self.items.remove(pending) else {
            return false;
        };
        let new_id = confirmed.id;
        if keep_local {
            local.id = new_id;
        } else {
            let deleted = local.deleted;
            let deleted_at = local.deleted_at;
            local = confirmed;
            local.deleted = deleted;
            local.deleted_at = deleted_at;
            local.clamp_size();
            local.normalize_data();
        }
        for slot in &mut self.order {
            if slot == pending {
                *slot = new_id;
            }
        }
        self.items.insert(new_id, local);
        true
    }

    /// Items in paint order, skipping tombstoned ones unless `include_deleted`.
    #[must_use]
    pub fn all(&self, include_deleted: bool) -> Vec<&Item> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id))
            .filter(|item| include_deleted || !item.deleted)
            .collect()
    }

    /// Items sorted by `(z_index, insertion order)` for drawing.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<&Item> {
        let mut items = self.all(false);
        items.sort_by_key(|item| item.z_index);
        items
    }

    /// One above the highest z-index in the store.
    #[must_use]
    pub fn next_z_index(&self) -> i64 {
        self.items
            .values()
            .map(|item| item.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Number of items, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
