//! Remote seed source.
//!
//! The reducer never performs I/O. It asks the [`SeedSource`] in its
//! environment for a request future and hands that future to the runtime
//! as an [`Effect`](pocket_todo_core::effect::Effect).

use crate::config::Config;
use crate::error::SeedError;
use crate::types::RemoteTodo;
use futures::future::BoxFuture;

/// Result of one seed fetch
pub type SeedResult = Result<Vec<RemoteTodo>, SeedError>;

/// Something that can produce the seed list
///
/// `fetch` is called synchronously from the reducer; implementations must not
/// do any work until the returned future is polled.
pub trait SeedSource: Send + Sync {
    /// Start a fetch
    fn fetch(&self) -> BoxFuture<'static, SeedResult>;
}

/// Seed source backed by an HTTP endpoint returning a JSON array of todos
#[derive(Debug, Clone)]
pub struct HttpSeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSeedSource {
    /// Creates a source for `url` with a default client
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Creates a source from configuration, applying the request timeout
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, SeedError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| SeedError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: config.seed_url.clone(),
        })
    }
}

impl SeedSource for HttpSeedSource {
    fn fetch(&self) -> BoxFuture<'static, SeedResult> {
        let client = self.client.clone();
        let url = self.url.clone();

        Box::pin(async move {
            tracing::debug!(%url, "Requesting seed todos");

            let response = client
                .get(&url)
                .header("accept", "application/json")
                .send()
                .await
                .map_err(|e| SeedError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SeedError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<Vec<RemoteTodo>>()
                .await
                .map_err(|e| SeedError::Decode(e.to_string()))
        })
    }
}
