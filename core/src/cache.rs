//! Client-side query cache with explicit invalidation events.
//!
//! # Design
//! A snapshot is kept per `QueryKey`. `invalidate` drops the snapshot,
//! bumps the key's generation and broadcasts `CacheEvent::Invalidated`.
//! A fetch that started before an invalidation is not allowed to store its
//! (now stale) result, so a reader always sees at least the effects of
//! mutations that completed before it asked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::Todo;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Todos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Invalidated(QueryKey),
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    data: Option<Vec<Todo>>,
}

#[derive(Debug)]
struct Inner {
    slots: Mutex<HashMap<QueryKey, Slot>>,
    events: broadcast::Sender<CacheEvent>,
}

/// Cloneable handle; all clones share one cache.
#[derive(Debug, Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: QueryKey) -> Option<Vec<Todo>> {
        self.slots().get(&key).and_then(|slot| slot.data.clone())
    }

    pub fn generation(&self, key: QueryKey) -> u64 {
        self.slots().get(&key).map_or(0, |slot| slot.generation)
    }

    /// Stores `data` unless the key was invalidated after `generation` was
    /// read. Returns whether the snapshot was kept.
    pub fn store(&self, key: QueryKey, generation: u64, data: Vec<Todo>) -> bool {
        let mut slots = self.slots();
        let slot = slots.entry(key).or_default();
        if slot.generation != generation {
            debug!(?key, "discarding fetch that raced an invalidation");
            return false;
        }
        slot.data = Some(data);
        true
    }

    pub fn invalidate(&self, key: QueryKey) {
        {
            let mut slots = self.slots();
            let slot = slots.entry(key).or_default();
            slot.generation += 1;
            slot.data = None;
        }
        debug!(?key, "invalidated");
        // No subscribers is fine; the next read refetches anyway.
        let _ = self.inner.events.send(CacheEvent::Invalidated(key));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }
}

/// Read-through query for the todo collection.
#[derive(Debug, Clone)]
pub struct TodosQuery<T> {
    api: ApiClient<T>,
    cache: QueryCache,
}

impl<T: Transport> TodosQuery<T> {
    pub fn new(api: ApiClient<T>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Returns the cached snapshot, or fetches and caches a new one.
    /// A failed fetch caches nothing.
    pub async fn fetch(&self) -> Result<Vec<Todo>, ApiError> {
        if let Some(todos) = self.cache.get(QueryKey::Todos) {
            return Ok(todos);
        }
        let generation = self.cache.generation(QueryKey::Todos);
        let todos = self.api.fetch_todos().await?;
        self.cache.store(QueryKey::Todos, generation, todos.clone());
        Ok(todos)
    }
}
