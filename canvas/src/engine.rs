use serde_json::Value;

use crate::consts::{DUPLICATE_OFFSET, MIN_ITEM_HEIGHT, MIN_ITEM_WIDTH, MIN_STROKE_POINTS};
use crate::doc::{Item, ItemId, ItemStore};
use crate::history::{History, OpKind};
use crate::input::{BoardSession, Button, EditDraft, GestureState, Key, Modifiers, PointerTarget, Tool, WheelDelta};
use crate::kind::{ItemKind, encode_points};
use crate::viewport::{Point, ScreenRect, Viewport, ZoomDirection};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
///
/// Item actions carry what must be persisted; the rest are renderer hints.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A new optimistic item exists locally and must be created remotely.
    ItemCreated(Item),
    /// An item's committed state changed and must be written remotely.
    ItemUpdated(Item),
    /// An item was tombstoned locally.
    ItemDeleted { id: ItemId },
    /// A tombstoned item was brought back locally.
    ItemRestored { id: ItemId },
    /// Show the kind-specific overlay editor over the item.
    EditorOpened { id: ItemId, kind: ItemKind, data: Value, rect: ScreenRect },
    /// Hide the overlay editor.
    EditorClosed { id: ItemId },
    SetCursor(&'static str),
    RenderNeeded,
}

/// Engine state: viewport, item store, UI session, active gesture, and undo log.
///
/// Every handler runs to completion synchronously and reports what changed
/// through the returned actions. Nothing here suspends or performs I/O.
pub struct EngineCore {
    pub store: ItemStore,
    pub viewport: Viewport,
    pub session: BoardSession,
    pub gesture: GestureState,
    pub history: History,
    /// Viewing surface width in screen pixels.
    pub viewport_width: f64,
    /// Viewing surface height in screen pixels.
    pub viewport_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            store: ItemStore::new(),
            viewport: Viewport::default(),
            session: BoardSession::default(),
            gesture: GestureState::default(),
            history: History::new(),
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate the store from the persistence service's item list.
    pub fn load_snapshot(&mut self, items: Vec<Item>) {
        self.store.load_snapshot(items);
        if let Some(id) = self.session.selected_id {
            if !self.is_live(&id) {
                self.session.selected_id = None;
            }
        }
    }

    /// Swap a pending item's temporary id for its confirmed server id
    /// everywhere it is referenced.
    pub fn confirm_created(&mut self, pending: &ItemId, confirmed: Item, keep_local: bool) -> bool {
        let new_id = confirmed.id;
        if !self.store.confirm(pending, confirmed, keep_local) {
            return false;
        }
        self.history.remap(pending, new_id);
        self.session.remap(pending, new_id);
        self.gesture.remap(pending, new_id);
        true
    }

    /// Apply the persistence service's stored representation of an item.
    /// The local tombstone state is kept.
    pub fn reconcile(&mut self, stored: &Item) -> bool {
        self.store.overwrite(stored)
    }

    // --- Tool / viewport ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.session.tool = tool;
    }

    /// Update the viewing surface size in screen pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    // --- Queries ---

    /// The currently selected item, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ItemId> {
        self.session.selected_id
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.store.get(id)
    }

    /// Items in paint order, for the renderer.
    #[must_use]
    pub fn items(&self, include_deleted: bool) -> Vec<&Item> {
        self.store.all(include_deleted)
    }

    /// Id of the item whose overlay editor is open, if any.
    #[must_use]
    pub fn editing(&self) -> Option<ItemId> {
        match self.gesture {
            GestureState::Editing { id } => Some(id),
            _ => None,
        }
    }

    /// Screen rectangle of an item, for positioning its overlay editor.
    #[must_use]
    pub fn editor_rect(&self, id: &ItemId) -> Option<ScreenRect> {
        let item = self.store.get(id)?;
        Some(self.viewport.rect_to_screen(item.position(), item.size()))
    }

    /// Top-left position that centers a new `kind` item in the visible area.
    #[must_use]
    pub fn center_placement(&self, kind: ItemKind) -> Point {
        let center = self
            .viewport
            .center_board(self.viewport_width, self.viewport_height);
        let size = kind.spec().default_size;
        Point::new(center.x - size.width * 0.5, center.y - size.height * 0.5)
    }

    /// No gesture or editor is in progress.
    fn is_idle(&self) -> bool {
        matches!(self.gesture, GestureState::Idle)
    }

    fn is_live(&self, id: &ItemId) -> bool {
        self.store.get(id).is_some_and(|item| !item.deleted)
    }

    // --- Item commands ---

    /// Create a `kind` item at `position` (board space) and select it.
    /// Ignored while a gesture or editor is active, like every command here.
    pub fn create_item(&mut self, kind: ItemKind, position: Point) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        let item = self.store.create(kind, position);
        self.history.record_add(item.id);
        self.session.selected_id = Some(item.id);
        vec![Action::ItemCreated(item), Action::RenderNeeded]
    }

    /// Create a `kind` item centered in the visible area.
    pub fn create_at_center(&mut self, kind: ItemKind) -> Vec<Action> {
        let position = self.center_placement(kind);
        self.create_item(kind, position)
    }

    /// Copy the selected item, offset slightly, as a new item.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        let Some(source) = self
            .session
            .selected_id
            .and_then(|id| self.store.get(&id))
            .filter(|item| !item.deleted)
        else {
            return Vec::new();
        };
        let mut copy = source.clone();
        copy.id = ItemId::new_pending();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.z_index = self.store.next_z_index();
        self.store.insert(copy.clone());
        self.history.record_add(copy.id);
        self.session.selected_id = Some(copy.id);
        vec![Action::ItemCreated(copy), Action::RenderNeeded]
    }

    /// Tombstone an item, recording it for undo.
    pub fn delete_item(&mut self, id: &ItemId) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        let Some(pre_image) = self.store.get(id).filter(|item| !item.deleted).cloned() else {
            return Vec::new();
        };
        self.history.record_delete(&pre_image);
        self.store.soft_delete(id);
        if self.session.selected_id.as_ref() == Some(id) {
            self.session.selected_id = None;
        }
        vec![Action::ItemDeleted { id: *id }, Action::RenderNeeded]
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        match self.session.selected_id {
            Some(id) => self.delete_item(&id),
            None => Vec::new(),
        }
    }

    /// Reverse the most recent recorded mutation. No-op if the log is empty
    /// or a gesture is in progress.
    pub fn undo(&mut self) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        let Some(entry) = self.history.pop() else {
            return Vec::new();
        };
        let id = entry.id;
        match entry.op {
            OpKind::Add => {
                if !self.store.soft_delete(&id) {
                    return Vec::new();
                }
                if self.session.selected_id == Some(id) {
                    self.session.selected_id = None;
                }
                vec![Action::ItemDeleted { id }, Action::RenderNeeded]
            }
            OpKind::Delete => {
                if !self.store.restore(&id) {
                    return Vec::new();
                }
                vec![Action::ItemRestored { id }, Action::RenderNeeded]
            }
            OpKind::Update => {
                let Some(pre_image) = entry.pre_image else {
                    return Vec::new();
                };
                if !self.store.overwrite(&pre_image) {
                    return Vec::new();
                }
                match self.store.get(&id) {
                    Some(item) => vec![Action::ItemUpdated(item.clone()), Action::RenderNeeded],
                    None => Vec::new(),
                }
            }
        }
    }

    // --- Overlay editing ---

    /// Open the overlay editor for an item. Only from idle, and only for
    /// kinds that have an editor.
    pub fn open_editor(&mut self, id: &ItemId) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        let Some(item) = self.store.get(id).filter(|item| !item.deleted) else {
            return Vec::new();
        };
        if !item.kind.opens_editor_on_double_click() {
            return Vec::new();
        }
        let opened = Action::EditorOpened {
            id: *id,
            kind: item.kind,
            data: item.data.clone(),
            rect: self.viewport.rect_to_screen(item.position(), item.size()),
        };
        self.gesture = GestureState::Editing { id: *id };
        self.session.selected_id = Some(*id);
        self.session.edit = Some(EditDraft { id: *id, patch: Value::Object(serde_json::Map::new()) });
        vec![opened, Action::RenderNeeded]
    }

    /// Merge fields into the open editor's draft. Null values are kept so
    /// they remove keys on commit. Returns `false` if no editor is open.
    pub fn update_edit_draft(&mut self, patch: &Value) -> bool {
        let Some(draft) = self.session.edit.as_mut() else {
            return false;
        };
        let (Some(target), Some(incoming)) = (draft.patch.as_object_mut(), patch.as_object()) else {
            return false;
        };
        for (k, v) in incoming {
            target.insert(k.clone(), v.clone());
        }
        true
    }

    /// Close the editor and apply its draft to the item.
    pub fn commit_edit(&mut self) -> Vec<Action> {
        let GestureState::Editing { id } = self.gesture else {
            return Vec::new();
        };
        self.gesture = GestureState::Idle;
        let draft = self.session.edit.take();
        let mut actions = vec![Action::EditorClosed { id }];

        let (Some(draft), Some(pre_image)) = (draft, self.store.get(&id).cloned()) else {
            actions.push(Action::RenderNeeded);
            return actions;
        };
        if self.store.patch_data(&id, &draft.patch) {
            self.history.record_update(&pre_image);
            if let Some(item) = self.store.get(&id) {
                actions.push(Action::ItemUpdated(item.clone()));
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Close the editor and discard its draft.
    pub fn cancel_edit(&mut self) -> Vec<Action> {
        let GestureState::Editing { id } = self.gesture else {
            return Vec::new();
        };
        self.gesture = GestureState::Idle;
        self.session.edit = None;
        vec![Action::EditorClosed { id }, Action::RenderNeeded]
    }

    // --- Input events ---

    /// Start a gesture. Ignored while another gesture or an editor is active.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button, target: PointerTarget) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        match button {
            Button::Secondary => return Vec::new(),
            Button::Middle => return self.start_pan(screen),
            Button::Primary => {}
        }

        if self.session.tool == Tool::Draw {
            let start = self.viewport.to_board(screen);
            self.gesture = GestureState::FreehandDrawing { points: vec![start] };
            return vec![Action::SetCursor("crosshair"), Action::RenderNeeded];
        }

        match target {
            PointerTarget::Handle(id, corner) if self.is_live(&id) => {
                let Some(item) = self.store.get(&id).cloned() else {
                    return self.start_pan(screen);
                };
                if !item.kind.is_resizable() {
                    return self.start_drag(screen, item);
                }
                self.session.selected_id = Some(id);
                self.gesture = GestureState::ResizingItem {
                    id,
                    corner,
                    start_screen: screen,
                    orig_size: item.size(),
                    pre_image: Box::new(item),
                    resized: false,
                };
                vec![Action::SetCursor(corner.cursor()), Action::RenderNeeded]
            }
            PointerTarget::Item(id) if self.is_live(&id) => match self.store.get(&id).cloned() {
                Some(item) => self.start_drag(screen, item),
                None => self.start_pan(screen),
            },
            _ => {
                let had_selection = self.session.selected_id.take().is_some();
                let mut actions = self.start_pan(screen);
                if had_selection {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
        }
    }

    fn start_pan(&mut self, screen: Point) -> Vec<Action> {
        self.gesture = GestureState::Panning { last_screen: screen };
        vec![Action::SetCursor("grabbing")]
    }

    fn start_drag(&mut self, screen: Point, item: Item) -> Vec<Action> {
        self.session.selected_id = Some(item.id);
        self.gesture = GestureState::DraggingItem {
            id: item.id,
            start_screen: screen,
            pre_image: Box::new(item),
            moved: false,
        };
        vec![Action::SetCursor("move"), Action::RenderNeeded]
    }

    /// Continue the active gesture.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let scale = self.viewport.scale;
        match &mut self.gesture {
            GestureState::Idle | GestureState::Editing { .. } => Vec::new(),
            GestureState::Panning { last_screen } => {
                let dx = screen.x - last_screen.x;
                let dy = screen.y - last_screen.y;
                *last_screen = screen;
                if dx == 0.0 && dy == 0.0 {
                    return Vec::new();
                }
                self.viewport.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            GestureState::DraggingItem { id, start_screen, pre_image, moved } => {
                let x = pre_image.x + (screen.x - start_screen.x) / scale;
                let y = pre_image.y + (screen.y - start_screen.y) / scale;
                let unchanged = self
                    .store
                    .get(id)
                    .is_none_or(|item| item.x == x && item.y == y);
                if unchanged {
                    return Vec::new();
                }
                if !*moved {
                    self.history.record_update(pre_image);
                    *moved = true;
                }
                self.store.move_item(id, x, y);
                vec![Action::RenderNeeded]
            }
            GestureState::ResizingItem { id, corner, start_screen, orig_size, pre_image, resized } => {
                let delta = Point::new((screen.x - start_screen.x) / scale, (screen.y - start_screen.y) / scale);
                let size = corner.apply(*orig_size, delta);
                let unchanged = self
                    .store
                    .get(id)
                    .is_none_or(|item| item.size() == size);
                if unchanged {
                    return Vec::new();
                }
                if !*resized {
                    self.history.record_update(pre_image);
                    *resized = true;
                }
                self.store.resize_from(id, *corner, *orig_size, delta);
                vec![Action::RenderNeeded]
            }
            GestureState::FreehandDrawing { points } => {
                let board = self.viewport.to_board(screen);
                if points.last() == Some(&board) {
                    return Vec::new();
                }
                points.push(board);
                vec![Action::RenderNeeded]
            }
        }
    }

    /// End the active gesture, emitting the single persistence action for it.
    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        if !self.gesture.is_active() {
            return Vec::new();
        }
        let mut actions = self.on_pointer_move(screen);
        actions.retain(|a| !matches!(a, Action::RenderNeeded));

        match std::mem::take(&mut self.gesture) {
            GestureState::DraggingItem { id, moved: true, .. } | GestureState::ResizingItem { id, resized: true, .. } => {
                if let Some(item) = self.store.get(&id) {
                    actions.push(Action::ItemUpdated(item.clone()));
                }
            }
            GestureState::FreehandDrawing { points } => {
                actions.extend(self.finish_stroke(&points));
            }
            _ => {}
        }
        actions.push(Action::SetCursor("default"));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn finish_stroke(&mut self, points: &[Point]) -> Vec<Action> {
        if points.len() < MIN_STROKE_POINTS {
            return Vec::new();
        }
        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let relative: Vec<Point> = points
            .iter()
            .map(|p| Point::new(p.x - min_x, p.y - min_y))
            .collect();

        let mut item = Item::new(ItemId::new_pending(), ItemKind::DrawingPath, Point::new(min_x, min_y));
        item.width = (max_x - min_x).max(MIN_ITEM_WIDTH);
        item.height = (max_y - min_y).max(MIN_ITEM_HEIGHT);
        item.z_index = self.store.next_z_index();
        item.data["points"] = encode_points(&relative);

        self.store.insert(item.clone());
        self.history.record_add(item.id);
        vec![Action::ItemCreated(item)]
    }

    /// Open the editor for an editable item under the pointer.
    pub fn on_double_click(&mut self, target: PointerTarget) -> Vec<Action> {
        match target {
            PointerTarget::Item(id) | PointerTarget::Handle(id, _) => self.open_editor(&id),
            PointerTarget::Canvas | PointerTarget::Unclassified => Vec::new(),
        }
    }

    /// Zoom one step around the pointer. Only while idle.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.is_idle() {
            return Vec::new();
        }
        let Some(direction) = ZoomDirection::from_wheel(delta.dy) else {
            return Vec::new();
        };
        if self.viewport.zoom_at(screen, direction) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if matches!(self.gesture, GestureState::Editing { .. }) {
            if key.is("Escape") {
                return self.cancel_edit();
            }
            if key.is("Enter") && !modifiers.shift {
                return self.commit_edit();
            }
            return Vec::new();
        }
        if self.gesture.is_active() {
            return Vec::new();
        }

        if modifiers.command() && key.is("z") && !modifiers.shift {
            return self.undo();
        }
        if modifiers.command() && key.is("d") {
            return self.duplicate_selected();
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selected();
        }
        if key.is("Escape") && self.session.selected_id.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }
}
