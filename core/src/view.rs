//! List and item view models.
//!
//! These hold the UI-side state of the todo list (what is shown, which item
//! is being edited, the new-todo input) and forward user actions to
//! `TodoMutations`. Rendering is plain text.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::api::ApiClient;
use crate::cache::{CacheEvent, QueryCache, QueryKey, TodosQuery};
use crate::error::ApiError;
use crate::mutation::TodoMutations;
use crate::transport::Transport;
use crate::types::{EditTodo, Todo};

/// What a guarded user action ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Applied(T),
    /// The action was not available in the current state, or its input was
    /// blank; nothing was sent.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemState {
    Viewing,
    Editing { buffer: String },
}

/// One row of the list.
#[derive(Debug)]
pub struct TodoItemView<T> {
    todo: Todo,
    state: ItemState,
    mutations: Arc<TodoMutations<T>>,
}

impl<T: Transport> TodoItemView<T> {
    pub fn new(todo: Todo, mutations: Arc<TodoMutations<T>>) -> Self {
        Self {
            todo,
            state: ItemState::Viewing,
            mutations,
        }
    }

    pub fn todo(&self) -> &Todo {
        &self.todo
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    /// Enters editing with the current text in the buffer.
    pub fn start_edit(&mut self) {
        if self.state == ItemState::Viewing {
            self.state = ItemState::Editing {
                buffer: self.todo.text.clone(),
            };
        }
    }

    pub fn set_buffer(&mut self, text: &str) {
        if let ItemState::Editing { buffer } = &mut self.state {
            *buffer = text.to_string();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.state = ItemState::Viewing;
    }

    /// Saves the trimmed buffer. A blank buffer is ignored and the item
    /// stays in editing; so does a failed save, with its buffer intact.
    pub async fn save(&mut self) -> Result<ActionOutcome<Todo>, ApiError> {
        let ItemState::Editing { buffer } = &self.state else {
            return Ok(ActionOutcome::Skipped);
        };
        let text = buffer.trim();
        if text.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        let edit = EditTodo {
            id: self.todo.id.clone(),
            text: text.to_string(),
        };
        let todo = self.mutations.edit_todo(&edit).await?;
        self.todo = todo.clone();
        self.state = ItemState::Viewing;
        Ok(ActionOutcome::Applied(todo))
    }

    pub async fn toggle(&mut self) -> Result<ActionOutcome<Todo>, ApiError> {
        if self.state != ItemState::Viewing {
            return Ok(ActionOutcome::Skipped);
        }
        let todo = self.mutations.toggle_todo(&self.todo).await?;
        self.todo = todo.clone();
        Ok(ActionOutcome::Applied(todo))
    }

    /// No confirmation step.
    pub async fn delete(&self) -> Result<ActionOutcome<()>, ApiError> {
        if self.state != ItemState::Viewing {
            return Ok(ActionOutcome::Skipped);
        }
        self.mutations.delete_todo(&self.todo.id).await?;
        Ok(ActionOutcome::Applied(()))
    }

    pub fn render(&self) -> String {
        let mark = if self.todo.completed { 'x' } else { ' ' };
        match &self.state {
            ItemState::Viewing => format!("[{mark}] {}", self.todo.text),
            ItemState::Editing { buffer } => format!("[{mark}] > {buffer}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Loaded(Vec<Todo>),
    Failed(ApiError),
}

/// The todo list: the cached collection plus the new-todo input.
#[derive(Debug)]
pub struct TodoListView<T> {
    query: TodosQuery<T>,
    mutations: Arc<TodoMutations<T>>,
    events: broadcast::Receiver<CacheEvent>,
    input: String,
    state: ListState,
}

impl<T: Transport + Clone> TodoListView<T> {
    pub fn new(api: ApiClient<T>, cache: QueryCache) -> Self {
        let events = cache.subscribe();
        Self {
            query: TodosQuery::new(api.clone(), cache.clone()),
            mutations: Arc::new(TodoMutations::new(api, cache)),
            events,
            input: String::new(),
            state: ListState::Loading,
        }
    }
}

impl<T: Transport> TodoListView<T> {
    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn mutations(&self) -> &Arc<TodoMutations<T>> {
        &self.mutations
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    pub async fn refresh(&mut self) -> &ListState {
        self.state = ListState::Loading;
        self.state = match self.query.fetch().await {
            Ok(todos) => ListState::Loaded(todos),
            Err(err) => {
                warn!(error = %err, "could not load todos");
                ListState::Failed(err)
            }
        };
        &self.state
    }

    /// Waits for the todo query to be invalidated, then refreshes. Returns
    /// `None` if the cache has gone away.
    pub async fn refresh_on_invalidation(&mut self) -> Option<&ListState> {
        loop {
            match self.events.recv().await {
                Ok(CacheEvent::Invalidated(QueryKey::Todos)) => break,
                // Missed events still mean the snapshot is stale.
                Err(RecvError::Lagged(_)) => break,
                Err(RecvError::Closed) => return None,
            }
        }
        Some(self.refresh().await)
    }

    /// Adds the trimmed input as a new todo. Blank input is ignored; the
    /// input is cleared once the server accepted the todo.
    pub async fn add(&mut self) -> Result<ActionOutcome<Todo>, ApiError> {
        let text = self.input.trim();
        if text.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        let todo = self.mutations.add_todo(text).await?;
        self.input.clear();
        Ok(ActionOutcome::Applied(todo))
    }

    /// Item views for the loaded todos, all in `Viewing`.
    pub fn items(&self) -> Vec<TodoItemView<T>> {
        match &self.state {
            ListState::Loaded(todos) => todos
                .iter()
                .map(|todo| TodoItemView::new(todo.clone(), Arc::clone(&self.mutations)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn item(&self, id: &str) -> Option<TodoItemView<T>> {
        self.items().into_iter().find(|item| item.todo().id == id)
    }

    pub fn render(&self) -> String {
        match &self.state {
            ListState::Loading => "Loading todos...".to_string(),
            ListState::Failed(_) => "Error loading todos".to_string(),
            ListState::Loaded(todos) if todos.is_empty() => "No todos".to_string(),
            ListState::Loaded(_) => {
                let mut out = String::new();
                for item in self.items() {
                    let _ = writeln!(out, "{}  ({})", item.render(), item.todo().id);
                }
                out.truncate(out.trim_end().len());
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mutation::MutationStatus;
    use crate::testing::ScriptedTransport;

    const GROCERIES: &str = r#"{"id":"1","text":"Buy groceries","completed":false}"#;

    fn item(transport: &ScriptedTransport) -> TodoItemView<ScriptedTransport> {
        let mutations = TodoMutations::new(
            ApiClient::new("http://test", transport.clone()),
            QueryCache::new(),
        );
        TodoItemView::new(Todo::new("1", "Buy groceries", false), Arc::new(mutations))
    }

    #[test]
    fn edit_captures_text_and_cancel_discards_it() {
        let transport = ScriptedTransport::new();
        let mut view = item(&transport);

        view.start_edit();
        assert_eq!(
            view.state(),
            &ItemState::Editing { buffer: "Buy groceries".to_string() }
        );
        view.set_buffer("Buy bread");
        view.cancel_edit();

        assert_eq!(view.state(), &ItemState::Viewing);
        assert_eq!(view.todo().text, "Buy groceries");
    }

    #[test]
    fn set_buffer_outside_editing_is_ignored() {
        let transport = ScriptedTransport::new();
        let mut view = item(&transport);
        view.set_buffer("ignored");
        assert_eq!(view.state(), &ItemState::Viewing);
    }

    #[tokio::test]
    async fn blank_save_is_a_no_op() {
        let transport = ScriptedTransport::new();
        let mut view = item(&transport);
        view.start_edit();
        view.set_buffer("   ");

        assert_eq!(view.save().await.unwrap(), ActionOutcome::Skipped);
        assert!(matches!(view.state(), ItemState::Editing { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn save_sends_trimmed_text_and_returns_to_viewing() {
        let transport = ScriptedTransport::new();
        transport.push(200, r#"{"id":"1","text":"Buy bread","completed":false}"#);
        let mut view = item(&transport);
        view.start_edit();
        view.set_buffer("  Buy bread ");

        let outcome = view.save().await.unwrap();

        assert_eq!(outcome, ActionOutcome::Applied(Todo::new("1", "Buy bread", false)));
        assert_eq!(view.state(), &ItemState::Viewing);
        let body: serde_json::Value =
            serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "text": "Buy bread" }));
    }

    #[tokio::test]
    async fn failed_save_keeps_buffer() {
        let transport = ScriptedTransport::new();
        transport.push(500, "");
        let mut view = item(&transport);
        view.start_edit();
        view.set_buffer("Buy bread");

        let err = view.save().await.unwrap_err();

        assert_eq!(err.op(), Operation::Edit);
        assert_eq!(view.state(), &ItemState::Editing { buffer: "Buy bread".to_string() });
    }

    #[tokio::test]
    async fn toggle_and_delete_are_unavailable_while_editing() {
        let transport = ScriptedTransport::new();
        let mut view = item(&transport);
        view.start_edit();

        assert_eq!(view.toggle().await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(view.delete().await.unwrap(), ActionOutcome::Skipped);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn toggle_keeps_state_machine_in_viewing() {
        let transport = ScriptedTransport::new();
        transport.push(200, r#"{"id":"1","text":"Buy groceries","completed":true}"#);
        let mut view = item(&transport);

        view.toggle().await.unwrap();

        assert!(view.todo().completed);
        assert_eq!(view.state(), &ItemState::Viewing);
        assert_eq!(view.render(), "[x] Buy groceries");
    }

    #[tokio::test]
    async fn list_renders_loaded_and_failed_states() {
        let transport = ScriptedTransport::new();
        transport.push(500, "");
        transport.push(200, &format!("[{GROCERIES}]"));
        let mut list = TodoListView::new(ApiClient::new("http://test", transport), QueryCache::new());
        assert_eq!(list.render(), "Loading todos...");

        assert!(matches!(list.refresh().await, ListState::Failed(_)));
        assert_eq!(list.render(), "Error loading todos");

        list.refresh().await;
        assert_eq!(list.render(), "[ ] Buy groceries  (1)");
    }

    #[tokio::test]
    async fn add_ignores_blank_input_and_clears_on_success() {
        let transport = ScriptedTransport::new();
        transport.push(201, r#"{"id":"2","text":"Walk","completed":false}"#);
        let mut list = TodoListView::new(ApiClient::new("http://test", transport.clone()), QueryCache::new());

        list.set_input("  ");
        assert_eq!(list.add().await.unwrap(), ActionOutcome::Skipped);
        assert!(transport.requests().is_empty());

        list.set_input(" Walk ");
        assert!(matches!(list.add().await.unwrap(), ActionOutcome::Applied(_)));
        assert_eq!(list.input(), "");
        assert_eq!(list.mutations().add.status(), MutationStatus::Succeeded);
    }

    #[tokio::test]
    async fn failed_add_keeps_input() {
        let transport = ScriptedTransport::new();
        transport.push(500, "");
        let mut list = TodoListView::new(ApiClient::new("http://test", transport), QueryCache::new());

        list.set_input("Walk");
        assert!(list.add().await.is_err());
        assert_eq!(list.input(), "Walk");
    }
}
