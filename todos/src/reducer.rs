//! Reducer logic for the todo store.
//!
//! Local mutations apply synchronously and never fail: unknown ids and titles
//! that are empty after trimming are ignored. `FetchSeedTodos` is the only
//! action with an effect.
//! Each fetch carries a [`FetchToken`]; a result whose token is not the one
//! in flight is stale and dropped, so the most recent request wins.

use crate::config::{Config, DEFAULT_OWNER, DEFAULT_SEED_LIMIT};
use crate::error::SeedError;
use crate::seed::{HttpSeedSource, SeedSource};
use crate::types::{FetchToken, RemoteTodo, Todo, TodoAction, TodoId, TodoState};
use pocket_todo_core::{effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec};
use std::collections::HashSet;
use std::sync::Arc;

/// Message stored when a fetch fails without a description
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch todos";

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Where seed data comes from
    pub seed: Arc<dyn SeedSource>,
    /// How many remote records a fetch keeps
    pub seed_limit: usize,
    /// Owner assigned to locally created todos
    pub default_owner: u64,
}

impl TodoEnvironment {
    /// Creates an environment with the default seed limit and owner
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, seed: Arc<dyn SeedSource>) -> Self {
        Self {
            clock,
            seed,
            seed_limit: DEFAULT_SEED_LIMIT,
            default_owner: DEFAULT_OWNER,
        }
    }

    /// Creates a production environment with an HTTP seed source
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, SeedError> {
        let seed = HttpSeedSource::from_config(config)?;
        Ok(Self {
            clock,
            seed: Arc::new(seed),
            seed_limit: config.seed_limit,
            default_owner: config.default_owner,
        })
    }

    /// Overrides the seed limit
    #[must_use]
    pub const fn with_seed_limit(mut self, seed_limit: usize) -> Self {
        self.seed_limit = seed_limit;
        self
    }

    /// Overrides the owner of local todos
    #[must_use]
    pub const fn with_default_owner(mut self, owner: u64) -> Self {
        self.default_owner = owner;
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("seed_limit", &self.seed_limit)
            .field("default_owner", &self.default_owner)
            .finish_non_exhaustive()
    }
}

/// Reducer for the todo store
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add_todo(state: &mut TodoState, title: &str, env: &TodoEnvironment) {
        let title = title.trim();
        if title.is_empty() {
            tracing::debug!("Ignoring todo with empty title");
            return;
        }

        let Some(id) = state.next_id() else {
            tracing::warn!("Ignoring new todo: no id left after the largest one");
            return;
        };
        state
            .todos
            .push(Todo::new(id, title.to_string(), env.default_owner, env.clock.now()));
        tracing::debug!(%id, "Todo added");
    }

    fn edit_todo(state: &mut TodoState, id: TodoId, title: &str, env: &TodoEnvironment) {
        let title = title.trim();
        if title.is_empty() {
            tracing::debug!(%id, "Ignoring edit with empty title");
            return;
        }

        match state.get_mut(id) {
            Some(todo) => {
                title.clone_into(&mut todo.title);
                todo.touch(env.clock.now());
            },
            None => tracing::debug!(%id, "Edit for unknown todo ignored"),
        }
    }

    fn toggle_todo(state: &mut TodoState, id: TodoId, env: &TodoEnvironment) {
        match state.get_mut(id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                todo.touch(env.clock.now());
            },
            None => tracing::debug!(%id, "Toggle for unknown todo ignored"),
        }
    }

    fn delete_todo(state: &mut TodoState, id: TodoId) {
        let before = state.todos.len();
        state.todos.retain(|t| t.id != id);
        if state.todos.len() == before {
            tracing::debug!(%id, "Delete for unknown todo ignored");
        }
    }

    /// Issues a new token and returns the effect performing the fetch
    fn begin_fetch(state: &mut TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        state.next_token += 1;
        let token = FetchToken::new(state.next_token);

        if let Some(previous) = state.in_flight.replace(token) {
            tracing::debug!(%previous, %token, "Superseding outstanding fetch");
        }
        state.is_loading = true;
        state.error = None;

        metrics::counter!("todos.fetch.started").increment(1);
        tracing::info!(%token, "Fetching seed todos");

        let request = env.seed.fetch();
        Effect::future(async move {
            Some(match request.await {
                Ok(todos) => TodoAction::SeedTodosLoaded { token, todos },
                Err(error) => TodoAction::SeedTodosFailed {
                    token,
                    error: error.to_string(),
                },
            })
        })
    }

    fn cancel_fetch(state: &mut TodoState) {
        if let Some(token) = state.in_flight.take() {
            state.is_loading = false;
            tracing::info!(%token, "Seed fetch cancelled");
        }
    }

    /// Clears the in-flight marker if `token` owns it
    fn settle(state: &mut TodoState, token: FetchToken) -> bool {
        if state.in_flight != Some(token) {
            metrics::counter!("todos.fetch.stale").increment(1);
            tracing::debug!(%token, "Discarding stale fetch result");
            return false;
        }

        state.in_flight = None;
        state.is_loading = false;
        true
    }

    fn seed_loaded(
        state: &mut TodoState,
        token: FetchToken,
        remote: Vec<RemoteTodo>,
        env: &TodoEnvironment,
    ) {
        if !Self::settle(state, token) {
            return;
        }

        let now = env.clock.now();
        let mut seen = HashSet::new();
        let mut todos = Vec::with_capacity(remote.len().min(env.seed_limit));

        for record in remote.into_iter().take(env.seed_limit) {
            if !seen.insert(record.id) {
                tracing::warn!(id = record.id, "Dropping duplicate remote todo");
                continue;
            }
            todos.push(record.into_todo(now));
        }

        tracing::info!(%token, count = todos.len(), "Seed todos loaded");
        metrics::counter!("todos.fetch.loaded").increment(1);
        state.todos = todos;
    }

    fn seed_failed(state: &mut TodoState, token: FetchToken, error: String) {
        if !Self::settle(state, token) {
            return;
        }

        let message = if error.is_empty() {
            FETCH_FAILED_MESSAGE.to_string()
        } else {
            error
        };

        tracing::warn!(%token, error = %message, "Seed fetch failed");
        metrics::counter!("todos.fetch.failed").increment(1);
        state.error = Some(message);
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Local mutations ==========
            TodoAction::AddTodo { title } => Self::add_todo(state, &title, env),
            TodoAction::EditTodo { id, title } => Self::edit_todo(state, id, &title, env),
            TodoAction::ToggleTodo { id } => Self::toggle_todo(state, id, env),
            TodoAction::DeleteTodo { id } => Self::delete_todo(state, id),
            TodoAction::SetFilter { filter } => state.filter = filter,
            TodoAction::SetSortBy { sort_by } => state.sort_by = sort_by,

            // ========== Seed fetch ==========
            TodoAction::FetchSeedTodos => return smallvec![Self::begin_fetch(state, env)],
            TodoAction::CancelFetch => Self::cancel_fetch(state),
            TodoAction::SeedTodosLoaded { token, todos } => {
                Self::seed_loaded(state, token, todos, env);
            },
            TodoAction::SeedTodosFailed { token, error } => Self::seed_failed(state, token, error),
        }

        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{remote_todos, StaticSeedSource};
    use crate::types::{Filter, SortBy};
    use pocket_todo_testing::{assertions, mocks::epoch, stepping_clock, test_clock, ReducerTest};

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(test_clock()), Arc::new(StaticSeedSource::new(remote_todos(25))))
    }

    fn add(title: &str) -> TodoAction {
        TodoAction::AddTodo {
            title: title.to_string(),
        }
    }

    fn seeded_state(titles: &[&str]) -> TodoState {
        let mut state = TodoState::new();
        let env = create_test_env();
        for title in titles {
            let _ = TodoReducer::new().reduce(&mut state, add(title), &env);
        }
        state
    }

    fn loading_state(token: u64) -> TodoState {
        TodoState {
            is_loading: true,
            in_flight: Some(FetchToken::new(token)),
            next_token: token,
            ..TodoState::new()
        }
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_actions([add("  a "), add("b"), add("c")])
            .then_state(|state| {
                let ids: Vec<u64> = state.todos.iter().map(|t| t.id.get()).collect();
                assert_eq!(ids, vec![1, 2, 3]);

                let todo = &state.todos[0];
                assert_eq!(todo.title, "a");
                assert!(!todo.completed);
                assert_eq!(todo.owner, DEFAULT_OWNER);
                assert_eq!(todo.created_at, epoch());
                assert_eq!(todo.updated_at, epoch());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_after_delete_uses_max_plus_one() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state(&["a", "b", "c"]))
            .when_actions([TodoAction::DeleteTodo { id: TodoId::new(2) }, add("d")])
            .then_state(|state| {
                let ids: Vec<u64> = state.todos.iter().map(|t| t.id.get()).collect();
                assert_eq!(ids, vec![1, 3, 4]);
            })
            .run();
    }

    #[test]
    fn test_add_after_max_remote_id_is_ignored() {
        let last = RemoteTodo {
            id: u64::MAX,
            title: "last".to_string(),
            completed: false,
            user_id: 1,
        };

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(loading_state(1))
            .when_actions([
                TodoAction::SeedTodosLoaded {
                    token: FetchToken::new(1),
                    todos: vec![last],
                },
                add("next"),
            ])
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert_eq!(state.todos[0].id, TodoId::new(u64::MAX));
                assert_eq!(state.todos[0].title, "last");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_blank_title_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_actions([add(""), add("   ")])
            .then_state(|state| assert!(state.todos.is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_uses_configured_owner() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env().with_default_owner(7))
            .given_state(TodoState::new())
            .when_action(add("mine"))
            .then_state(|state| assert_eq!(state.todos[0].owner, 7))
            .run();
    }

    #[test]
    fn test_edit_replaces_title_and_touches() {
        let env = TodoEnvironment::new(Arc::new(stepping_clock()), Arc::new(StaticSeedSource::default()));
        let mut state = TodoState::new();
        let reducer = TodoReducer::new();
        let _ = reducer.reduce(&mut state, add("draft"), &env);

        ReducerTest::new(reducer)
            .with_env(env)
            .given_state(state)
            .when_action(TodoAction::EditTodo {
                id: TodoId::new(1),
                title: "final".to_string(),
            })
            .then_state(|state| {
                let todo = state.get(TodoId::new(1)).unwrap();
                assert_eq!(todo.title, "final");
                assert!(todo.updated_at > todo.created_at);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_edit_with_empty_title_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state(&["keep"]))
            .when_action(TodoAction::EditTodo {
                id: TodoId::new(1),
                title: String::new(),
            })
            .then_state(|state| assert_eq!(state.todos[0].title, "keep"))
            .run();
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state(&["a"]))
            .when_action(TodoAction::ToggleTodo { id: TodoId::new(1) })
            .then_state(|state| assert!(state.todos[0].completed))
            .run();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state(&["a"]))
            .when_actions([
                TodoAction::ToggleTodo { id: TodoId::new(1) },
                TodoAction::ToggleTodo { id: TodoId::new(1) },
            ])
            .then_state(|state| assert!(!state.todos[0].completed))
            .run();
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let before = seeded_state(&["a", "b"]);
        let expected = before.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(before)
            .when_actions([
                TodoAction::ToggleTodo { id: TodoId::new(99) },
                TodoAction::EditTodo {
                    id: TodoId::new(99),
                    title: "nope".to_string(),
                },
                TodoAction::DeleteTodo { id: TodoId::new(99) },
            ])
            .then_state(move |state| assert_eq!(*state, expected))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_delete_is_idempotent() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state(&["a", "b"]))
            .when_actions([
                TodoAction::DeleteTodo { id: TodoId::new(1) },
                TodoAction::DeleteTodo { id: TodoId::new(1) },
            ])
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert!(state.get(TodoId::new(1)).is_none());
            })
            .run();
    }

    #[test]
    fn test_set_filter_and_sort_only_change_flags() {
        let before = seeded_state(&["a", "b"]);
        let todos = before.todos.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(before)
            .when_actions([
                TodoAction::SetFilter { filter: Filter::Done },
                TodoAction::SetSortBy {
                    sort_by: SortBy::MostRecent,
                },
            ])
            .then_state(move |state| {
                assert_eq!(state.filter, Filter::Done);
                assert_eq!(state.sort_by, SortBy::MostRecent);
                assert_eq!(state.todos, todos);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_fetch_sets_loading_and_returns_future() {
        let mut given = TodoState::new();
        given.error = Some("old failure".to_string());

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(given)
            .when_action(TodoAction::FetchSeedTodos)
            .then_state(|state| {
                assert!(state.is_loading);
                assert!(state.error.is_none());
                assert_eq!(state.in_flight, Some(FetchToken::new(1)));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_second_fetch_supersedes_first() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_actions([TodoAction::FetchSeedTodos, TodoAction::FetchSeedTodos])
            .then_state(|state| assert_eq!(state.in_flight, Some(FetchToken::new(2))))
            .then_effects(|effects| assertions::assert_effects_count(effects, 2))
            .run();
    }

    #[test]
    fn test_loaded_replaces_todos_and_truncates() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState {
                todos: seeded_state(&["local"]).todos,
                ..loading_state(1)
            })
            .when_action(TodoAction::SeedTodosLoaded {
                token: FetchToken::new(1),
                todos: remote_todos(25),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 20);
                assert_eq!(state.todos[0].id, TodoId::new(1));
                assert_eq!(state.todos[19].id, TodoId::new(20));
                assert!(state.todos.iter().all(|t| t.created_at == epoch() && t.updated_at == epoch()));
                assert!(!state.is_loading);
                assert!(state.in_flight.is_none());
                assert!(state.error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_loaded_respects_custom_limit() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env().with_seed_limit(3))
            .given_state(loading_state(1))
            .when_action(TodoAction::SeedTodosLoaded {
                token: FetchToken::new(1),
                todos: remote_todos(25),
            })
            .then_state(|state| assert_eq!(state.todos.len(), 3))
            .run();
    }

    #[test]
    fn test_loaded_drops_duplicate_ids() {
        let mut remote = remote_todos(3);
        let mut duplicate = remote[0].clone();
        duplicate.title = "second copy".to_string();
        remote.push(duplicate);

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(loading_state(1))
            .when_action(TodoAction::SeedTodosLoaded {
                token: FetchToken::new(1),
                todos: remote,
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 3);
                assert_eq!(state.todos[0].title, "remote todo 1");
            })
            .run();
    }

    #[test]
    fn test_add_after_seed_continues_from_remote_ids() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(loading_state(1))
            .when_actions([
                TodoAction::SeedTodosLoaded {
                    token: FetchToken::new(1),
                    todos: remote_todos(25),
                },
                add("after seed"),
            ])
            .then_state(|state| {
                assert_eq!(state.todos.len(), 21);
                assert_eq!(state.todos[20].id, TodoId::new(21));
            })
            .run();
    }

    #[test]
    fn test_failed_keeps_todos_and_records_error() {
        let before = TodoState {
            todos: seeded_state(&["a", "b"]).todos,
            ..loading_state(1)
        };
        let todos = before.todos.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(before)
            .when_action(TodoAction::SeedTodosFailed {
                token: FetchToken::new(1),
                error: "Request failed: connection refused".to_string(),
            })
            .then_state(move |state| {
                assert_eq!(state.todos, todos);
                assert!(!state.is_loading);
                assert_eq!(state.error.as_deref(), Some("Request failed: connection refused"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_failed_with_empty_message_uses_fallback() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(loading_state(1))
            .when_action(TodoAction::SeedTodosFailed {
                token: FetchToken::new(1),
                error: String::new(),
            })
            .then_state(|state| assert_eq!(state.error.as_deref(), Some(FETCH_FAILED_MESSAGE)))
            .run();
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let before = TodoState {
            todos: seeded_state(&["a"]).todos,
            ..loading_state(2)
        };
        let expected = before.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(before)
            .when_actions([
                TodoAction::SeedTodosLoaded {
                    token: FetchToken::new(1),
                    todos: remote_todos(5),
                },
                TodoAction::SeedTodosFailed {
                    token: FetchToken::new(1),
                    error: "late".to_string(),
                },
            ])
            .then_state(move |state| assert_eq!(*state, expected))
            .run();
    }

    #[test]
    fn test_cancel_discards_late_result() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state(&["a"]))
            .when_actions([
                TodoAction::FetchSeedTodos,
                TodoAction::CancelFetch,
                TodoAction::SeedTodosLoaded {
                    token: FetchToken::new(1),
                    todos: remote_todos(5),
                },
            ])
            .then_state(|state| {
                assert!(!state.is_loading);
                assert!(state.in_flight.is_none());
                assert_eq!(state.todos.len(), 1);
                assert_eq!(state.todos[0].title, "a");
            })
            .run();
    }

    #[test]
    fn test_cancel_without_fetch_is_a_no_op() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::CancelFetch)
            .then_state(|state| assert_eq!(*state, TodoState::new()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
