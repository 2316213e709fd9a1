use std::process::ExitCode;

use clap::{Parser, Subcommand};
use todo_core::{
    ActionOutcome, ApiClient, ApiError, QueryCache, ReqwestTransport, TodoItemView, TodoListView,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo", about = "Manage the todo list served by the mock todo API")]
struct Cli {
    /// Base URL of the todo API
    #[arg(long, env = "TODO_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show all todos (default)
    List,
    /// Add a todo
    Add { text: Vec<String> },
    /// Replace the text of a todo
    Edit { id: String, text: Vec<String> },
    /// Flip a todo between open and done
    Toggle { id: String },
    /// Delete a todo
    Delete { id: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no todo with id {0}")]
    UnknownId(String),

    #[error("todo text must not be empty")]
    EmptyText,
}

type View = TodoListView<ReqwestTransport>;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn find(view: &mut View, id: &str) -> Result<TodoItemView<ReqwestTransport>, CliError> {
    view.refresh().await;
    view.item(id).ok_or_else(|| CliError::UnknownId(id.to_string()))
}

fn applied<T>(outcome: ActionOutcome<T>) -> Result<(), CliError> {
    match outcome {
        ActionOutcome::Applied(_) => Ok(()),
        ActionOutcome::Skipped => Err(CliError::EmptyText),
    }
}

async fn execute(view: &mut View, command: Command) -> Result<(), CliError> {
    match command {
        Command::List => {}
        Command::Add { text } => {
            view.set_input(&text.join(" "));
            applied(view.add().await?)?;
        }
        Command::Edit { id, text } => {
            let mut item = find(view, &id).await?;
            item.start_edit();
            item.set_buffer(&text.join(" "));
            applied(item.save().await?)?;
        }
        Command::Toggle { id } => {
            let mut item = find(view, &id).await?;
            applied(item.toggle().await?)?;
        }
        Command::Delete { id } => {
            let item = find(view, &id).await?;
            applied(item.delete().await?)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let api = ApiClient::new(&cli.api_url, ReqwestTransport::default());
    let mut view = TodoListView::new(api, QueryCache::new());

    let result = execute(&mut view, cli.command.unwrap_or(Command::List)).await;

    // Mutations invalidated the cache, so this shows the server's view.
    view.refresh().await;
    println!("Todo app\n\n{}", view.render());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
