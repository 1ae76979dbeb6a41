//! In-memory seed sources for tests and offline runs.

use crate::error::SeedError;
use crate::seed::{SeedResult, SeedSource};
use crate::types::RemoteTodo;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Builds `count` remote todos with ids `1..=count`, every third one completed
#[must_use]
pub fn remote_todos(count: u64) -> Vec<RemoteTodo> {
    (1..=count)
        .map(|id| RemoteTodo {
            id,
            title: format!("remote todo {id}"),
            completed: id % 3 == 0,
            user_id: 1 + (id - 1) / 10,
        })
        .collect()
}

/// Always answers with the same records
#[derive(Debug, Default)]
pub struct StaticSeedSource {
    todos: Vec<RemoteTodo>,
    calls: AtomicUsize,
}

impl StaticSeedSource {
    /// Creates a source serving `todos`
    #[must_use]
    pub const fn new(todos: Vec<RemoteTodo>) -> Self {
        Self {
            todos,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many fetches were started
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SeedSource for StaticSeedSource {
    fn fetch(&self) -> BoxFuture<'static, SeedResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let todos = self.todos.clone();
        Box::pin(async move { Ok(todos) })
    }
}

/// Always fails with the same error
#[derive(Debug, Clone)]
pub struct FailingSeedSource {
    error: SeedError,
}

impl FailingSeedSource {
    /// Creates a source that fails with `error`
    #[must_use]
    pub const fn new(error: SeedError) -> Self {
        Self { error }
    }
}

impl SeedSource for FailingSeedSource {
    fn fetch(&self) -> BoxFuture<'static, SeedResult> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

/// Seed source whose replies are released by the test
///
/// Each fetch takes the next reply slot, in call order, and stays pending
/// until the matching [`oneshot::Sender`] is used. Dropping a sender makes
/// the fetch fail.
#[derive(Debug)]
pub struct ScriptedSeedSource {
    replies: Arc<Mutex<VecDeque<oneshot::Receiver<SeedResult>>>>,
}

impl ScriptedSeedSource {
    /// Creates a source with `count` reply slots and returns their senders
    #[must_use]
    pub fn with_replies(count: usize) -> (Self, Vec<oneshot::Sender<SeedResult>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();

        let source = Self {
            replies: Arc::new(Mutex::new(receivers)),
        };
        (source, senders)
    }
}

impl SeedSource for ScriptedSeedSource {
    fn fetch(&self) -> BoxFuture<'static, SeedResult> {
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());

        Box::pin(async move {
            match reply {
                Some(reply) => reply
                    .await
                    .unwrap_or_else(|_| Err(SeedError::Request("reply dropped".to_string()))),
                None => Err(SeedError::Request("no scripted reply left".to_string())),
            }
        })
    }
}
