//! In-memory persistence service and fixtures for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use canvas::doc::{Item, ItemId};
use canvas::kind::ItemKind;
use canvas::viewport::Point;
use tokio::sync::oneshot;

use crate::api::{ApiError, ItemApi};

/// First id handed out by [`MockApi::create_item`].
pub const FIRST_SERVER_ID: i64 = 100;

/// One call received by the mock, in the order calls started.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(Item),
    Update(i64, Item),
    SoftDelete(i64),
    Undelete(i64),
}

/// Echoing item store. Calls can be held on a gate or made to fail by their
/// 0-based start index.
pub struct MockApi {
    next_id: AtomicI64,
    items: Mutex<Vec<Item>>,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<usize, oneshot::Receiver<()>>>,
    failures: Mutex<HashMap<usize, ApiError>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            next_id: AtomicI64::new(FIRST_SERVER_ID),
            items: Mutex::new(items),
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Hold call `index` until the returned sender fires (or is dropped).
    pub fn gate(&self, index: usize) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(index, rx);
        tx
    }

    /// Make call `index` fail with `err`.
    pub fn fail(&self, index: usize, err: ApiError) {
        self.failures.lock().unwrap().insert(index, err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: Call) -> Result<(), ApiError> {
        let (gate, failure) = {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(call);
            (self.gates.lock().unwrap().remove(&index), self.failures.lock().unwrap().remove(&index))
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ItemApi for MockApi {
    async fn list_items(&self, include_deleted: bool) -> Result<Vec<Item>, ApiError> {
        self.enter(Call::List).await?;
        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|item| include_deleted || !item.deleted)
            .cloned()
            .collect())
    }

    async fn create_item(&self, item: &Item) -> Result<Item, ApiError> {
        self.enter(Call::Create(item.clone())).await?;
        let mut created = item.clone();
        created.id = ItemId::Server(self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(created)
    }

    async fn update_item(&self, id: i64, item: &Item) -> Result<Item, ApiError> {
        self.enter(Call::Update(id, item.clone())).await?;
        let mut stored = item.clone();
        stored.id = ItemId::Server(id);
        Ok(stored)
    }

    async fn soft_delete_item(&self, id: i64) -> Result<(), ApiError> {
        self.enter(Call::SoftDelete(id)).await
    }

    async fn undelete_item(&self, id: i64) -> Result<(), ApiError> {
        self.enter(Call::Undelete(id)).await
    }
}

/// Route log output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
}

/// Sticky note with a server id at `(x, y)`.
pub fn server_note(id: i64, x: f64, y: f64) -> Item {
    Item::new(ItemId::Server(id), ItemKind::StickyNote, Point::new(x, y))
}

/// Let spawned tasks run until they block.
pub async fn run_pending_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
