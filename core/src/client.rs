//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `ApiClient` glues the two halves to a `Transport`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, Operation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{EditTodo, NewTodo, Todo, TodoPatch};

/// Unreserved characters stay readable in `/todo/{id}`.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/todo/{}", self.base_url, utf8_percent_encode(id, ID_SEGMENT))
    }

    pub fn build_fetch_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Trims `text`; blank input is refused without building a request.
    pub fn build_post_todo(&self, text: &str) -> Result<HttpRequest, ApiError> {
        let text = non_empty(text, Operation::Create)?;
        json_request(
            Operation::Create,
            HttpMethod::Post,
            format!("{}/todos", self.base_url),
            &NewTodo { text },
        )
    }

    pub fn build_remove_todo(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sends only `text`, so the server keeps the current `completed` flag.
    pub fn build_patch_todo(&self, edit: &EditTodo) -> Result<HttpRequest, ApiError> {
        let patch = TodoPatch {
            text: Some(non_empty(&edit.text, Operation::Edit)?),
            completed: None,
        };
        json_request(Operation::Edit, HttpMethod::Patch, self.item_path(&edit.id), &patch)
    }

    /// The server has no toggle endpoint: the flipped flag is computed here
    /// and sent as an ordinary patch.
    pub fn build_toggle_todo(&self, todo: &Todo) -> Result<HttpRequest, ApiError> {
        let patch = TodoPatch {
            text: Some(todo.text.clone()),
            completed: Some(!todo.completed),
        };
        json_request(Operation::Toggle, HttpMethod::Patch, self.item_path(&todo.id), &patch)
    }

    pub fn parse_fetch_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        decode(Operation::Fetch, response)
    }

    pub fn parse_post_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(Operation::Create, response)
    }

    /// The removed record in the body is not needed by callers.
    pub fn parse_remove_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Operation::Delete)
    }

    pub fn parse_patch_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(Operation::Edit, response)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(Operation::Toggle, response)
    }
}

fn non_empty(text: &str, op: Operation) -> Result<String, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::EmptyText { op });
    }
    Ok(trimmed.to_string())
}

fn json_request<B: Serialize>(
    op: Operation,
    method: HttpMethod,
    path: String,
    body: &B,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(body).map_err(|e| ApiError::Encode {
        op,
        message: e.to_string(),
    })?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(op: Operation, response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response, op)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
        op,
        message: e.to_string(),
    })
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, op: Operation) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound { op });
    }
    Err(ApiError::Status {
        op,
        status: response.status,
        body: response.body.clone(),
    })
}
