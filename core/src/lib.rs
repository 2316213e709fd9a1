//! Client side of the todo list: API client, query cache, mutations and
//! view models.
//!
//! # Overview
//! `TodoClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern); `ApiClient` pairs it
//! with a `Transport` to make async calls. Reads go through `TodosQuery`,
//! writes through `TodoMutations`, which invalidate the cached collection
//! when the server confirms them.
//!
//! # Design
//! - `TodoClient` is stateless: it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Cache invalidation is an explicit broadcast event; views subscribe and
//!   refetch.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod mutation;
pub mod transport;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::ApiClient;
pub use cache::{CacheEvent, QueryCache, QueryKey, TodosQuery};
pub use client::TodoClient;
pub use error::{ApiError, Operation, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mutation::{Mutation, MutationStatus, TodoMutations};
pub use transport::{ReqwestTransport, Transport};
pub use types::{EditTodo, NewTodo, Todo, TodoPatch};
pub use view::{ActionOutcome, ItemState, ListState, TodoItemView, TodoListView};
