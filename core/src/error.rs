//! Error types for the todo API client.
//!
//! # Design
//! Every variant carries the `Operation` that failed, so a caller can show
//! "delete failed" without knowing which HTTP status produced it. `NotFound`
//! still gets its own variant because a vanished todo is usually handled
//! differently from a broken server.

use std::fmt;

use thiserror::Error;

/// The five calls the API client can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Delete,
    Edit,
    Toggle,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::Edit => "edit",
            Operation::Toggle => "toggle",
        };
        f.write_str(name)
    }
}

/// Errors returned by `TodoClient` and `ApiClient`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404: the todo does not exist (any more).
    #[error("{op} failed: todo not found")]
    NotFound { op: Operation },

    /// The server returned a non-2xx status other than 404.
    #[error("{op} failed: HTTP {status}: {body}")]
    Status {
        op: Operation,
        status: u16,
        body: String,
    },

    /// No response was received at all.
    #[error("{op} failed: {message}")]
    Transport { op: Operation, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("{op} failed: could not decode response: {message}")]
    Decode { op: Operation, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("{op} failed: could not encode request: {message}")]
    Encode { op: Operation, message: String },

    /// Blank text was refused before any request went out.
    #[error("{op} failed: todo text must not be empty")]
    EmptyText { op: Operation },
}

impl ApiError {
    pub fn op(&self) -> Operation {
        match self {
            ApiError::NotFound { op }
            | ApiError::Status { op, .. }
            | ApiError::Transport { op, .. }
            | ApiError::Decode { op, .. }
            | ApiError::Encode { op, .. }
            | ApiError::EmptyText { op } => *op,
        }
    }
}

/// Failure of a `Transport` to produce any response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);
