//! Board: one open board view.
//!
//! Owns the interaction engine and the sync coordinator for the lifetime of
//! the view. Every input handler runs the engine synchronously, hands the
//! resulting persistence actions to the coordinator, applies any replies
//! that already arrived, and returns all actions for the host to render.
//! Closing or dropping the board aborts in-flight persistence calls.

use std::sync::Arc;

use canvas::doc::ItemId;
use canvas::engine::{Action, EngineCore};
use canvas::hit::hit_test;
use canvas::input::{Button, Key, Modifiers, PointerTarget, Tool, WheelDelta};
use canvas::kind::ItemKind;
use canvas::viewport::Point;
use rand::Rng;
use serde_json::Value;
use tracing::info;

use crate::api::{ApiError, HttpItemApi, ItemApi};
use crate::config::BoardConfig;
use crate::sync::SyncCoordinator;

/// Maximum board-unit offset applied to toolbar-created items so repeated
/// adds do not stack exactly.
const ADD_JITTER: f64 = 40.0;

pub struct Board {
    engine: EngineCore,
    sync: SyncCoordinator,
}

impl Board {
    /// Load the board's items and open a view over them.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial item list cannot be fetched.
    pub async fn open(api: Arc<dyn ItemApi>, config: &BoardConfig) -> Result<Self, ApiError> {
        let items = api.list_items(false).await?;
        info!(count = items.len(), api_url = %config.api_url, "board loaded");
        let mut engine = EngineCore::new();
        engine.load_snapshot(items);
        Ok(Self { engine, sync: SyncCoordinator::new(api, config.retry) })
    }

    /// Open a board backed by the HTTP persistence service.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the load fails.
    pub async fn open_http(config: &BoardConfig) -> Result<Self, ApiError> {
        let api = Arc::new(HttpItemApi::new(config)?);
        Self::open(api, config).await
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    #[must_use]
    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    fn route(&mut self, mut actions: Vec<Action>) -> Vec<Action> {
        for action in &actions {
            self.sync.dispatch(action);
        }
        actions.extend(self.sync.drain_ready(&mut self.engine));
        actions
    }

    // --- Host surface ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.engine.set_tool(tool);
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.engine.set_viewport(width, height);
    }

    /// Classify what lies under a screen point, for renderers that do not.
    #[must_use]
    pub fn classify(&self, screen: Point) -> PointerTarget {
        let board = self.engine.viewport.to_board(screen);
        PointerTarget::from_hit(hit_test(board, &self.engine.store, &self.engine.viewport, self.engine.selection()))
    }

    // --- Input events ---

    pub fn pointer_down(&mut self, screen: Point, button: Button, target: PointerTarget) -> Vec<Action> {
        let actions = self.engine.on_pointer_down(screen, button, target);
        self.route(actions)
    }

    pub fn pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let actions = self.engine.on_pointer_move(screen);
        self.route(actions)
    }

    pub fn pointer_up(&mut self, screen: Point) -> Vec<Action> {
        let actions = self.engine.on_pointer_up(screen);
        self.route(actions)
    }

    pub fn wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        let actions = self.engine.on_wheel(screen, delta);
        self.route(actions)
    }

    pub fn double_click(&mut self, target: PointerTarget) -> Vec<Action> {
        let actions = self.engine.on_double_click(target);
        self.route(actions)
    }

    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.engine.on_key_down(key, modifiers);
        self.route(actions)
    }

    // --- Commands ---

    /// Toolbar add: a `kind` item near the center of the visible area.
    pub fn add_item(&mut self, kind: ItemKind) -> Vec<Action> {
        let center = self.engine.center_placement(kind);
        let mut rng = rand::rng();
        let position = Point::new(
            center.x + rng.random_range(-ADD_JITTER..=ADD_JITTER),
            center.y + rng.random_range(-ADD_JITTER..=ADD_JITTER),
        );
        let actions = self.engine.create_item(kind, position);
        self.route(actions)
    }

    pub fn create_item(&mut self, kind: ItemKind, position: Point) -> Vec<Action> {
        let actions = self.engine.create_item(kind, position);
        self.route(actions)
    }

    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        let actions = self.engine.duplicate_selected();
        self.route(actions)
    }

    pub fn delete_item(&mut self, id: &ItemId) -> Vec<Action> {
        let actions = self.engine.delete_item(id);
        self.route(actions)
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        let actions = self.engine.delete_selected();
        self.route(actions)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let actions = self.engine.undo();
        self.route(actions)
    }

    pub fn open_editor(&mut self, id: &ItemId) -> Vec<Action> {
        let actions = self.engine.open_editor(id);
        self.route(actions)
    }

    /// Merge an editor's partial patch into the open draft.
    pub fn update_edit_draft(&mut self, patch: &Value) -> bool {
        self.engine.update_edit_draft(patch)
    }

    pub fn commit_edit(&mut self) -> Vec<Action> {
        let actions = self.engine.commit_edit();
        self.route(actions)
    }

    pub fn cancel_edit(&mut self) -> Vec<Action> {
        let actions = self.engine.cancel_edit();
        self.route(actions)
    }

    // --- Sync ---

    /// Apply replies that already arrived, without waiting.
    pub fn poll(&mut self) -> Vec<Action> {
        self.sync.drain_ready(&mut self.engine)
    }

    /// Wait for the next reply and apply it. `None` when nothing is in flight.
    pub async fn next_sync(&mut self) -> Option<Vec<Action>> {
        let completion = self.sync.next_completion().await?;
        Some(self.sync.apply(completion, &mut self.engine))
    }

    /// Wait for every in-flight call and apply the replies.
    pub async fn settle(&mut self) -> Vec<Action> {
        self.sync.settle(&mut self.engine).await
    }

    /// Close the view, abandoning in-flight calls.
    pub fn close(mut self) {
        self.sync.abort_all();
    }
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
