//! Sync coordinator: persists committed mutations and reconciles replies.
//!
//! DESIGN
//! ======
//! Each persistence call runs as its own task in a `JoinSet`. Replies are
//! applied to the engine on the caller's task, one at a time, in the order
//! the calls complete. Two updates to the same item resolve independently
//! and the reply that lands last wins; replies carry no version to reject
//! stale ones.
//!
//! Items created locally carry a pending id until their create confirms.
//! Updates issued in that window are folded into a dirty flag and replayed
//! against the server id on confirmation; a local tombstone is replayed as
//! a soft delete. Deletes and restores of a pending item need no call of
//! their own because the tombstone travels with the item.
//!
//! ERROR HANDLING
//! ==============
//! Failures are logged and local state stays the optimistic truth. Nothing
//! is rolled back and the gesture flow is never interrupted. Retryable
//! failures are retried with linear back-off when the policy allows it.
//! Creates are resent only when the service cannot have stored them, so a
//! timed-out create never becomes two rows.
//! Dropping the coordinator aborts every in-flight call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use canvas::doc::{Item, ItemId};
use canvas::engine::{Action, EngineCore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, ItemApi};
use crate::config::RetryPolicy;

/// Outcome of one persistence call.
#[derive(Debug)]
pub enum Completion {
    /// A create sent for the item still keyed by `pending`.
    Created { pending: ItemId, result: Result<Item, ApiError> },
    /// An update; a success carries the service's stored copy.
    Updated { id: i64, result: Result<Item, ApiError> },
    /// A soft delete.
    Deleted { id: i64, result: Result<(), ApiError> },
    /// An undelete.
    Restored { id: i64, result: Result<(), ApiError> },
}

pub struct SyncCoordinator {
    api: Arc<dyn ItemApi>,
    retry: RetryPolicy,
    tasks: JoinSet<Completion>,
    /// Creates in flight, keyed by pending id. `true` once the item was
    /// updated locally after the create was sent.
    unconfirmed: HashMap<ItemId, bool>,
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(api: Arc<dyn ItemApi>, retry: RetryPolicy) -> Self {
        Self { api, retry, tasks: JoinSet::new(), unconfirmed: HashMap::new() }
    }

    /// Number of persistence calls not yet applied.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Whether a create for `id` has been sent but not confirmed.
    #[must_use]
    pub fn is_unconfirmed(&self, id: &ItemId) -> bool {
        self.unconfirmed.contains_key(id)
    }

    // --- Outbound ---

    /// Route one engine action to the matching persistence call.
    pub fn dispatch(&mut self, action: &Action) {
        match action {
            Action::ItemCreated(item) => self.persist_create(item.clone()),
            Action::ItemUpdated(item) => self.persist_update(item.clone()),
            Action::ItemDeleted { id } => self.persist_soft_delete(*id),
            Action::ItemRestored { id } => self.persist_restore(*id),
            Action::EditorOpened { .. } | Action::EditorClosed { .. } | Action::SetCursor(_) | Action::RenderNeeded => {}
        }
    }

    pub fn persist_create(&mut self, item: Item) {
        let pending = item.id;
        if let Some(id) = pending.server() {
            warn!(item_id = id, "create requested for an item that already has a server id; sending update");
            self.persist_update(item);
            return;
        }
        debug!(item_id = %pending, kind = item.kind.wire_name(), "sync: create");
        self.unconfirmed.insert(pending, false);
        let api = Arc::clone(&self.api);
        let retry = self.retry;
        self.tasks.spawn(async move {
            let result = with_retry(retry, "create", ApiError::never_applied, || api.create_item(&item)).await;
            Completion::Created { pending, result }
        });
    }

    pub fn persist_update(&mut self, item: Item) {
        let Some(id) = item.id.server() else {
            match self.unconfirmed.get_mut(&item.id) {
                Some(dirty) => {
                    debug!(item_id = %item.id, "sync: update deferred until create confirms");
                    *dirty = true;
                }
                None => warn!(item_id = %item.id, "update for an item whose create is not in flight; dropping"),
            }
            return;
        };
        debug!(item_id = id, "sync: update");
        let api = Arc::clone(&self.api);
        let retry = self.retry;
        self.tasks.spawn(async move {
            let result = with_retry(retry, "update", ApiError::retryable, || api.update_item(id, &item)).await;
            Completion::Updated { id, result }
        });
    }

    pub fn persist_soft_delete(&mut self, id: ItemId) {
        let Some(server_id) = id.server() else {
            debug!(item_id = %id, "sync: delete of unconfirmed item rides on its create");
            return;
        };
        debug!(item_id = server_id, "sync: soft delete");
        let api = Arc::clone(&self.api);
        let retry = self.retry;
        self.tasks.spawn(async move {
            let result = with_retry(retry, "soft_delete", ApiError::retryable, || api.soft_delete_item(server_id)).await;
            Completion::Deleted { id: server_id, result }
        });
    }

    pub fn persist_restore(&mut self, id: ItemId) {
        let Some(server_id) = id.server() else {
            debug!(item_id = %id, "sync: restore of unconfirmed item rides on its create");
            return;
        };
        debug!(item_id = server_id, "sync: restore");
        let api = Arc::clone(&self.api);
        let retry = self.retry;
        self.tasks.spawn(async move {
            let result = with_retry(retry, "restore", ApiError::retryable, || api.undelete_item(server_id)).await;
            Completion::Restored { id: server_id, result }
        });
    }

    // --- Inbound ---

    /// Apply one completed call to the engine. May issue follow-up calls.
    pub fn apply(&mut self, completion: Completion, engine: &mut EngineCore) -> Vec<Action> {
        match completion {
            Completion::Created { pending, result: Ok(confirmed) } => self.confirm_create(pending, confirmed, engine),
            Completion::Created { pending, result: Err(e) } => {
                self.unconfirmed.remove(&pending);
                error!(item_id = %pending, error = %e, "create failed; keeping optimistic item");
                Vec::new()
            }
            Completion::Updated { id, result: Ok(stored) } => {
                if engine.reconcile(&stored) {
                    vec![Action::RenderNeeded]
                } else {
                    debug!(item_id = id, "update reply for an item no longer present; ignoring");
                    Vec::new()
                }
            }
            Completion::Updated { id, result: Err(e) } => {
                error!(item_id = id, error = %e, "update failed; keeping local state");
                Vec::new()
            }
            Completion::Deleted { id, result } => {
                match result {
                    Ok(()) => debug!(item_id = id, "soft delete confirmed"),
                    Err(e) => error!(item_id = id, error = %e, "soft delete failed; item stays deleted locally"),
                }
                Vec::new()
            }
            Completion::Restored { id, result } => {
                match result {
                    Ok(()) => debug!(item_id = id, "restore confirmed"),
                    Err(e) => error!(item_id = id, error = %e, "restore failed; item stays restored locally"),
                }
                Vec::new()
            }
        }
    }

    fn confirm_create(&mut self, pending: ItemId, confirmed: Item, engine: &mut EngineCore) -> Vec<Action> {
        let dirty = self.unconfirmed.remove(&pending).unwrap_or(false);
        let new_id = confirmed.id;
        if new_id.server().is_none() {
            error!(item_id = %pending, "create reply carried no server id; keeping optimistic item");
            return Vec::new();
        }
        if !engine.confirm_created(&pending, confirmed, dirty) {
            warn!(item_id = %pending, server_id = %new_id, "create confirmed for an item no longer present");
            return Vec::new();
        }
        info!(item_id = %pending, server_id = %new_id, dirty, "create confirmed");

        let Some(local) = engine.item(&new_id).cloned() else {
            return vec![Action::RenderNeeded];
        };
        let deleted = local.deleted;
        if dirty {
            self.persist_update(local);
        }
        if deleted {
            self.persist_soft_delete(new_id);
        }
        vec![Action::RenderNeeded]
    }

    /// Apply every call that has already completed, without waiting.
    pub fn drain_ready(&mut self, engine: &mut EngineCore) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Some(joined) = self.tasks.try_join_next() {
            if let Some(completion) = unpack(joined) {
                actions.extend(self.apply(completion, engine));
            }
        }
        actions
    }

    /// Wait for the next call to complete. `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Some(completion) = unpack(joined) {
                return Some(completion);
            }
        }
        None
    }

    /// Wait for and apply every in-flight call, including follow-ups they issue.
    pub async fn settle(&mut self, engine: &mut EngineCore) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Some(completion) = self.next_completion().await {
            actions.extend(self.apply(completion, engine));
        }
        actions
    }

    /// Abort every in-flight call. Their replies are never applied.
    pub fn abort_all(&mut self) {
        if !self.tasks.is_empty() {
            info!(count = self.tasks.len(), "aborting in-flight persistence calls");
        }
        drop(std::mem::take(&mut self.tasks));
        self.unconfirmed.clear();
    }
}

fn unpack(joined: Result<Completion, JoinError>) -> Option<Completion> {
    match joined {
        Ok(completion) => Some(completion),
        Err(e) if e.is_cancelled() => None,
        Err(e) => {
            error!(error = %e, "persistence task failed");
            None
        }
    }
}

/// Run `call`, retrying failures that `resend` accepts up to
/// `policy.retries` times. Creates pass a stricter `resend` than the
/// idempotent calls: a create that may have reached the service is not sent
/// again.
async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    op: &'static str,
    resend: fn(&ApiError) -> bool,
    mut call: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u64 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if resend(&e) && attempt < policy.retries as u64 => {
                attempt += 1;
                warn!(error = %e, op, attempt, total = policy.retries, "persistence call failed; retrying");
                tokio::time::sleep(backoff(attempt, policy.base_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Linear back-off before retry `attempt`, saturating on huge steps.
fn backoff(attempt: u64, base_ms: u64) -> Duration {
    Duration::from_millis(attempt.saturating_mul(base_ms))
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
