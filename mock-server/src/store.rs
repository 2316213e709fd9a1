//! In-memory backing store for the mock todo API.
//!
//! # Design
//! Handlers only see `TodoRepository`, so tests and the binary each build
//! their own instance; there is no process-wide state. `InMemoryRepository`
//! keeps todos in a `Vec` so `list` reflects insertion order.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Todo, TodoPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("todo not found: {0}")]
    NotFound(String),

    #[error("todo text must not be empty")]
    EmptyText,
}

/// CRUD over the todo collection.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn list(&self) -> Vec<Todo>;
    async fn create(&self, text: &str) -> Result<Todo, StoreError>;
    async fn remove(&self, id: &str) -> Result<Todo, StoreError>;
    async fn patch(&self, id: &str, patch: TodoPatch) -> Result<Todo, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    todos: RwLock<Vec<Todo>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos: RwLock::new(todos),
        }
    }

    /// The three todos the development mock starts with.
    pub fn seeded() -> Self {
        Self::with_todos(vec![
            Todo::new("1", "Buy groceries", false),
            Todo::new("2", "Walk the dog", true),
            Todo::new("3", "Code project", true),
        ])
    }
}

fn non_empty(text: &str) -> Result<String, StoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyText);
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl TodoRepository for InMemoryRepository {
    async fn list(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }

    async fn create(&self, text: &str) -> Result<Todo, StoreError> {
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            text: non_empty(text)?,
            completed: false,
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn remove(&self, id: &str) -> Result<Todo, StoreError> {
        let mut todos = self.todos.write().await;
        let pos = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(todos.remove(pos))
    }

    async fn patch(&self, id: &str, patch: TodoPatch) -> Result<Todo, StoreError> {
        // Validate before taking the lock so a rejected patch never half-applies.
        let text = patch.text.as_deref().map(non_empty).transpose()?;

        let mut todos = self.todos.write().await;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Some(text) = text {
            todo.text = text;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }
}
