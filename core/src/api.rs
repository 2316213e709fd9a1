//! Async API client: `TodoClient` plus a `Transport`.
//!
//! One request per call, no retries. Failures come back as `ApiError`
//! tagged with the operation that produced them.

use tracing::debug;

use crate::client::TodoClient;
use crate::error::{ApiError, Operation};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{EditTodo, Todo};

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }

    async fn send(&self, op: Operation, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(%op, method = request.method.as_str(), path = %request.path, "sending request");
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport {
                op,
                message: e.to_string(),
            })?;
        debug!(%op, status = response.status, "received response");
        Ok(response)
    }

    pub async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self
            .send(Operation::Fetch, self.client.build_fetch_todos())
            .await?;
        self.client.parse_fetch_todos(response)
    }

    pub async fn post_todo(&self, text: &str) -> Result<Todo, ApiError> {
        let request = self.client.build_post_todo(text)?;
        let response = self.send(Operation::Create, request).await?;
        self.client.parse_post_todo(response)
    }

    pub async fn remove_todo(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .send(Operation::Delete, self.client.build_remove_todo(id))
            .await?;
        self.client.parse_remove_todo(response)
    }

    pub async fn patch_todo(&self, edit: &EditTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_patch_todo(edit)?;
        let response = self.send(Operation::Edit, request).await?;
        self.client.parse_patch_todo(response)
    }

    pub async fn toggle_todo(&self, todo: &Todo) -> Result<Todo, ApiError> {
        let request = self.client.build_toggle_todo(todo)?;
        let response = self.send(Operation::Toggle, request).await?;
        self.client.parse_toggle_todo(response)
    }
}
