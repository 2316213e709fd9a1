//! Mock backend for the todo list.
//!
//! Serves the collection at `/todos` and single records at `/todo/{id}` on
//! top of any `TodoRepository`. Request bodies only carry the fields a
//! caller may set; ids are always assigned here.

pub mod config;
pub mod store;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn, Instrument};

pub use config::ServerConfig;
pub use store::{InMemoryRepository, StoreError, TodoRepository};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(id: &str, text: &str, completed: bool) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            completed,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub text: String,
}

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

pub type Repo = Arc<dyn TodoRepository>;

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::EmptyText => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Router over a fresh repository holding the development seed data.
pub fn app() -> Router {
    app_with(Arc::new(InMemoryRepository::seeded()))
}

pub fn app_with(repo: Repo) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todo/{id}", patch(patch_todo).delete(delete_todo))
        .route("/favicon.ico", get(|| async { StatusCode::OK }))
        .layer(middleware::from_fn(trace_request))
        .with_state(repo)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn trace_request(request: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );
    async move {
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "request finished");
        response
    }
    .instrument(span)
    .await
}

async fn list_todos(State(repo): State<Repo>) -> Json<Vec<Todo>> {
    let todos = repo.list().await;
    debug!(count = todos.len(), "listing todos");
    Json(todos)
}

async fn create_todo(
    State(repo): State<Repo>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StoreError> {
    let todo = repo.create(&input.text).await.inspect_err(|e| {
        warn!(error = %e, "rejected create");
    })?;
    info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn patch_todo(
    State(repo): State<Repo>,
    Path(id): Path<String>,
    Json(input): Json<TodoPatch>,
) -> Result<Json<Todo>, StoreError> {
    let todo = repo.patch(&id, input).await.inspect_err(|e| {
        warn!(%id, error = %e, "rejected patch");
    })?;
    info!(%id, completed = todo.completed, "patched todo");
    Ok(Json(todo))
}

async fn delete_todo(
    State(repo): State<Repo>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, StoreError> {
    let todo = repo.remove(&id).await.inspect_err(|e| {
        warn!(%id, error = %e, "rejected delete");
    })?;
    info!(%id, "deleted todo");
    Ok(Json(todo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_json() {
        let todo = Todo::new("1", "Test", false);
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["text"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn create_todo_rejects_missing_text() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_todo_ignores_client_supplied_fields() {
        let input: CreateTodo =
            serde_json::from_str(r#"{"text":"Hi","id":"x","completed":true}"#).unwrap();
        assert_eq!(input.text, "Hi");
    }

    #[test]
    fn patch_all_fields_optional() {
        let input: TodoPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.text.is_none());
        assert!(input.completed.is_none());
    }

    #[test]
    fn patch_partial_fields() {
        let input: TodoPatch = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert!(input.text.is_none());
        assert_eq!(input.completed, Some(true));
    }

    #[test]
    fn store_errors_map_to_status_codes() {
        let resp = StoreError::NotFound("9".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = StoreError::EmptyText.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
