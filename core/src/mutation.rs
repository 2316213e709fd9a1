//! Mutations: API calls that invalidate the todo query when they succeed.
//!
//! There are no optimistic updates. The list only changes after the server
//! confirmed the write and a fresh fetch came back.

use std::future::Future;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cache::{QueryCache, QueryKey};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{EditTodo, Todo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Succeeded,
    Failed(ApiError),
}

/// One mutation slot with observable status.
#[derive(Debug)]
pub struct Mutation {
    status: watch::Sender<MutationStatus>,
    cache: QueryCache,
}

impl Mutation {
    pub fn new(cache: QueryCache) -> Self {
        let (status, _) = watch::channel(MutationStatus::Idle);
        Self { status, cache }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.status.borrow(), MutationStatus::Pending)
    }

    pub fn error(&self) -> Option<ApiError> {
        match &*self.status.borrow() {
            MutationStatus::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    pub fn reset(&self) {
        self.status.send_replace(MutationStatus::Idle);
    }

    /// Drives `call` to completion. Success invalidates `QueryKey::Todos`
    /// before the status flips to `Succeeded`; failure leaves the cache
    /// alone.
    pub async fn run<O>(&self, call: impl Future<Output = Result<O, ApiError>>) -> Result<O, ApiError> {
        self.status.send_replace(MutationStatus::Pending);
        match call.await {
            Ok(output) => {
                self.cache.invalidate(QueryKey::Todos);
                self.status.send_replace(MutationStatus::Succeeded);
                Ok(output)
            }
            Err(err) => {
                warn!(op = %err.op(), error = %err, "mutation failed");
                self.status.send_replace(MutationStatus::Failed(err.clone()));
                Err(err)
            }
        }
    }
}

/// The four todo mutations, each with its own slot.
#[derive(Debug)]
pub struct TodoMutations<T> {
    api: ApiClient<T>,
    pub add: Mutation,
    pub edit: Mutation,
    pub delete: Mutation,
    pub toggle: Mutation,
}

impl<T: Transport> TodoMutations<T> {
    pub fn new(api: ApiClient<T>, cache: QueryCache) -> Self {
        Self {
            api,
            add: Mutation::new(cache.clone()),
            edit: Mutation::new(cache.clone()),
            delete: Mutation::new(cache.clone()),
            toggle: Mutation::new(cache),
        }
    }

    pub async fn add_todo(&self, text: &str) -> Result<Todo, ApiError> {
        let todo = self.add.run(self.api.post_todo(text)).await?;
        info!(id = %todo.id, "added todo");
        Ok(todo)
    }

    pub async fn edit_todo(&self, edit: &EditTodo) -> Result<Todo, ApiError> {
        let todo = self.edit.run(self.api.patch_todo(edit)).await?;
        info!(id = %todo.id, "edited todo");
        Ok(todo)
    }

    pub async fn delete_todo(&self, id: &str) -> Result<(), ApiError> {
        self.delete.run(self.api.remove_todo(id)).await?;
        info!(%id, "deleted todo");
        Ok(())
    }

    pub async fn toggle_todo(&self, todo: &Todo) -> Result<Todo, ApiError> {
        let todo = self.toggle.run(self.api.toggle_todo(todo)).await?;
        info!(id = %todo.id, completed = todo.completed, "toggled todo");
        Ok(todo)
    }
}
