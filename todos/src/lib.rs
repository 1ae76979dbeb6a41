//! Pocket Todo: a single-user todo list as a reducer-driven state store.
//!
//! The crate demonstrates:
//!
//! - Local mutations (add, edit, toggle, delete, filter, sort) as pure
//!   reducer transitions
//! - Derived views computed by selectors, never stored
//! - One asynchronous operation, fetching seed data over HTTP, with
//!   correlation tokens so only the latest request can land
//! - Testing with `ReducerTest` and in-memory seed sources
//!
//! # Quick Start
//!
//! ```no_run
//! use pocket_todo::{
//!     selectors, Config, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState,
//! };
//! use pocket_todo_core::environment::SystemClock;
//! use pocket_todo_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::from_config(&Config::from_env()?, Arc::new(SystemClock))?;
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Load seed data and wait for the result to land
//! let mut handle = store.send(TodoAction::FetchSeedTodos).await?;
//! handle.wait().await;
//!
//! store
//!     .send(TodoAction::ToggleTodo { id: TodoId::new(1) })
//!     .await?;
//!
//! let done = store.state(selectors::completed_count).await;
//! println!("Completed: {done}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod mocks;
pub mod reducer;
pub mod seed;
pub mod selectors;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, SeedError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use seed::{HttpSeedSource, SeedSource};
pub use selectors::TodoListView;
pub use types::{Filter, FetchToken, RemoteTodo, SortBy, Todo, TodoAction, TodoId, TodoState};

/// Store specialised to the todo reducer
pub type TodoStore = pocket_todo_runtime::Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
