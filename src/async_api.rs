//! Non-blocking adapter over the synchronous client.
//!
//! Each call runs the blocking core on tokio's blocking pool; the request
//! algorithm is the same one [`Api::fetch`] runs.

use std::sync::Arc;

use tracing::debug;

use crate::api::{Api, Envelope, Params};
use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct AsyncApi {
    api: Arc<Api>,
}

impl AsyncApi {
    pub fn new(api: Arc<Api>) -> Self {
        Self { api }
    }

    /// Client on the default host with an in-memory cache, built on the
    /// blocking pool
    pub async fn new_default() -> Result<Self> {
        let api = run_blocking(Api::new).await?;
        Ok(Self::new(Arc::new(api)))
    }

    /// Client built from loaded configuration on the blocking pool
    pub async fn from_config(config: &Config) -> Result<Self> {
        let config = config.clone();
        let api = run_blocking(move || Api::from_config(&config)).await?;
        Ok(Self::new(Arc::new(api)))
    }

    pub fn api(&self) -> &Arc<Api> {
        &self.api
    }

    pub async fn fetch(&self, path: &str, params: Params) -> Result<Envelope> {
        let path = path.to_string();
        self.spawn(move |api| api.fetch(&path, &params)).await
    }

    /// Run any blocking client work, such as a domain wrapper call, off the
    /// async runtime
    pub async fn spawn<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Api>) -> Result<T> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        run_blocking(move || work(api)).await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        debug!(error = %e, "Blocking API task failed to complete");
        Error::Concurrency {
            details: format!("API task failed: {}", e),
        }
    })?
}

impl From<Api> for AsyncApi {
    fn from(api: Api) -> Self {
        Self::new(Arc::new(api))
    }
}
