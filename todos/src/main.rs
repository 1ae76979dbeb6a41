//! Command-line demo for the todo store.
//!
//! Loads seed todos from the configured endpoint, adds any titles given as
//! arguments, toggles and edits a few items, then prints the list through
//! the selectors.
//!
//! ```bash
//! RUST_LOG=pocket_todo=debug pocket-todo "Buy milk" "Write docs"
//! ```

use pocket_todo::selectors::{self, TodoListView};
use pocket_todo::{Config, Filter, SortBy, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState, TodoStore};
use pocket_todo_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pocket_todo=info,pocket_todo_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Pocket Todo ===\n");

    let config = Config::load()?;
    tracing::info!(seed_url = %config.seed_url, seed_limit = config.seed_limit, "Loaded configuration");

    let env = TodoEnvironment::from_config(&config, Arc::new(SystemClock))?;
    let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);

    println!("Fetching seed todos from {}...", config.seed_url);
    let mut handle = store.send(TodoAction::FetchSeedTodos).await?;
    if handle.wait_with_timeout(Duration::from_secs(30)).await.is_err() {
        store.send(TodoAction::CancelFetch).await?;
        println!("Fetch took too long, continuing without seed data");
    }

    if let Some(error) = store.state(|s| s.error.clone()).await {
        println!("Could not load seed todos: {error}");
    }

    for title in std::env::args().skip(1) {
        let title = title.trim().to_string();
        if !title.is_empty() {
            store.send(TodoAction::AddTodo { title }).await?;
        }
    }

    if store.state(selectors::total_count).await == 0 {
        store
            .send(TodoAction::AddTodo {
                title: "Buy milk".to_string(),
            })
            .await?;
    }

    println!("\nToggling the first todo...");
    let first = store.state(|s| s.todos.first().map(|t| t.id)).await;
    if let Some(id) = first {
        store.send(TodoAction::ToggleTodo { id }).await?;
        store
            .send(TodoAction::EditTodo {
                id,
                title: "Reviewed first todo".to_string(),
            })
            .await?;
    }

    print_list(&store, "All todos").await;

    store.send(TodoAction::SetFilter { filter: Filter::Done }).await?;
    print_list(&store, "Done").await;

    store.send(TodoAction::SetFilter { filter: Filter::Active }).await?;
    store
        .send(TodoAction::SetSortBy {
            sort_by: SortBy::MostRecent,
        })
        .await?;
    print_list(&store, "Active, most recent first").await;

    store
        .send(TodoAction::DeleteTodo { id: TodoId::new(1) })
        .await?;

    let view = store.state(TodoListView::of).await;
    println!("\nView snapshot:\n{}", serde_json::to_string_pretty(&view)?);

    store.shutdown(Duration::from_secs(5)).await?;
    println!("\n=== Demo Complete ===");
    Ok(())
}

async fn print_list(store: &TodoStore, heading: &str) {
    let view = store.state(TodoListView::of).await;

    println!("\n{heading} ({} shown):", view.todos.len());
    for todo in &view.todos {
        let status = if todo.completed { "x" } else { " " };
        println!("  [{status}] #{} {}", todo.id, todo.title);
    }
    println!(
        "Completed: {}/{} ({} active)",
        view.completed, view.total, view.active
    );
}
