//! Derived views over [`TodoState`].
//!
//! Selectors are pure reads. They never mutate the state and may be called
//! as often as a caller likes.

use crate::types::{Filter, SortBy, Todo, TodoState};
use serde::Serialize;

/// Todos matching the current filter, in the current sort order
///
/// Both sorts are stable: `MostRecent` keeps insertion order among todos with
/// equal `updated_at`.
#[must_use]
pub fn visible_todos(state: &TodoState) -> Vec<&Todo> {
    let mut visible: Vec<&Todo> = state
        .todos
        .iter()
        .filter(|todo| state.filter.matches(todo))
        .collect();

    match state.sort_by {
        SortBy::Id => visible.sort_by_key(|todo| todo.id),
        SortBy::MostRecent => visible.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }

    visible
}

/// Number of todos, ignoring the filter
#[must_use]
pub fn total_count(state: &TodoState) -> usize {
    state.todos.len()
}

/// Number of completed todos, ignoring the filter
#[must_use]
pub fn completed_count(state: &TodoState) -> usize {
    state.todos.iter().filter(|todo| todo.completed).count()
}

/// Number of open todos, ignoring the filter
#[must_use]
pub fn active_count(state: &TodoState) -> usize {
    total_count(state) - completed_count(state)
}

/// Owned snapshot of everything a list view renders
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TodoListView {
    /// Visible todos in display order
    pub todos: Vec<Todo>,
    /// Active filter
    pub filter: Filter,
    /// Active sort mode
    pub sort_by: SortBy,
    /// Total count
    pub total: usize,
    /// Completed count
    pub completed: usize,
    /// Open count
    pub active: usize,
    /// Whether a fetch is in flight
    pub is_loading: bool,
    /// Last fetch failure
    pub error: Option<String>,
}

impl TodoListView {
    /// Captures the view of `state`
    #[must_use]
    pub fn of(state: &TodoState) -> Self {
        Self {
            todos: visible_todos(state).into_iter().cloned().collect(),
            filter: state.filter,
            sort_by: state.sort_by,
            total: total_count(state),
            completed: completed_count(state),
            active: active_count(state),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}
