//! Domain types for the todo store.
//!
//! A todo list is an ordered collection of [`Todo`] records plus the view
//! flags (filter, sort mode) and the bookkeeping for the one asynchronous
//! operation, fetching seed data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a todo, unique within a [`TodoState`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id that follows this one, or `None` at `u64::MAX`
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub title: String,
    /// Whether the todo is done
    pub completed: bool,
    /// External user id this todo belongs to (not validated)
    pub owner: u64,
    /// Set once when the todo enters the store
    pub created_at: DateTime<Utc>,
    /// Refreshed on every edit and toggle
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates an open todo with both timestamps set to `now`
    #[must_use]
    pub const fn new(id: TodoId, title: String, owner: u64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed: false,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, never moving it before `created_at`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

/// A todo as served by the remote seed source
///
/// The remote payload carries no timestamps, and names the owner `userId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTodo {
    /// Remote identifier, reused as the local id
    pub id: u64,
    /// Title text
    pub title: String,
    /// Completion flag
    pub completed: bool,
    /// Owning user
    #[serde(rename = "userId")]
    pub user_id: u64,
}

impl RemoteTodo {
    /// Converts into a local todo stamped with `now`
    #[must_use]
    pub fn into_todo(self, now: DateTime<Utc>) -> Todo {
        Todo {
            id: TodoId::new(self.id),
            title: self.title,
            completed: self.completed,
            owner: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Error returned when parsing a [`Filter`] or [`SortBy`] from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

/// Which todos the list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Only todos that are not completed
    Active,
    /// Only completed todos
    Done,
}

impl Filter {
    /// Whether `todo` passes this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Done => todo.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Done => "Done",
        })
    }
}

impl FromStr for Filter {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "done" => Ok(Self::Done),
            _ => Err(ParseModeError {
                kind: "filter",
                value: s.to_string(),
            }),
        }
    }
}

/// Order of the visible list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    /// Ascending by id (creation order)
    #[default]
    #[serde(rename = "ID")]
    Id,
    /// Descending by `updated_at`
    MostRecent,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "ID",
            Self::MostRecent => "MostRecent",
        })
    }
}

impl FromStr for SortBy {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "mostrecent" | "most-recent" | "most_recent" => Ok(Self::MostRecent),
            _ => Err(ParseModeError {
                kind: "sort mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Correlation token of one seed fetch
///
/// Results carrying a token other than the one in flight are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchToken(u64);

impl FetchToken {
    /// Creates a token from its sequence number
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }
}

impl fmt::Display for FetchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch-{}", self.0)
    }
}

/// The whole store
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Todos in insertion order; sorting is a view concern
    pub todos: Vec<Todo>,
    /// Active filter
    pub filter: Filter,
    /// Active sort mode
    pub sort_by: SortBy,
    /// True exactly while a fetch is in flight
    pub is_loading: bool,
    /// Message of the last failed fetch, cleared when a new one starts
    pub error: Option<String>,
    /// Token of the outstanding fetch
    pub in_flight: Option<FetchToken>,
    /// Sequence number for the next fetch token
    pub next_token: u64,
}

impl TodoState {
    /// Creates an empty state with `filter = All` and `sort_by = Id`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `todos`, with default view flags
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Returns a mutable todo by id
    pub fn get_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Id for the next locally created todo: max + 1, or 1 when empty
    ///
    /// Returns `None` when the largest id is already `u64::MAX`.
    #[must_use]
    pub fn next_id(&self) -> Option<TodoId> {
        match self.todos.iter().map(|t| t.id).max() {
            Some(max) => max.next(),
            None => Some(TodoId::new(1)),
        }
    }
}

/// Everything the store can be asked to do, plus the results fed back by
/// the fetch effect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Append a new todo
    AddTodo {
        /// Title; callers trim and reject empty input
        title: String,
    },

    /// Replace the title of a todo
    EditTodo {
        /// Todo to edit
        id: TodoId,
        /// New title
        title: String,
    },

    /// Flip the completion flag of a todo
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo
    DeleteTodo {
        /// Todo to remove
        id: TodoId,
    },

    /// Change the visible filter
    SetFilter {
        /// New filter
        filter: Filter,
    },

    /// Change the sort mode
    SetSortBy {
        /// New sort mode
        sort_by: SortBy,
    },

    /// Replace the collection with seed data from the remote source
    FetchSeedTodos,

    /// Forget the outstanding fetch; its result will be discarded
    CancelFetch,

    // ========== Effect results ==========
    /// The fetch identified by `token` succeeded
    SeedTodosLoaded {
        /// Correlation token issued by `FetchSeedTodos`
        token: FetchToken,
        /// Records as served, before truncation
        todos: Vec<RemoteTodo>,
    },

    /// The fetch identified by `token` failed
    SeedTodosFailed {
        /// Correlation token issued by `FetchSeedTodos`
        token: FetchToken,
        /// Human-readable failure message
        error: String,
    },
}
