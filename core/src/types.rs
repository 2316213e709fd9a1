//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(id: impl Into<String>, text: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed,
        }
    }
}

/// Arguments of the edit operation: new text for an existing todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTodo {
    pub id: String,
    pub text: String,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub text: String,
}

/// Request payload for `PATCH /todo/{id}`. Only the fields present in the
/// JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}
