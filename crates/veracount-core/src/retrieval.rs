//! Download of discovered objects into a staging directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::RefreshConfig;
use crate::error::RefreshError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::key::{KeyFilter, ObjectKey};

/// Fetches objects one at a time and writes them below a staging root.
#[derive(Clone)]
pub struct Retriever {
    http_client: Arc<dyn HttpClient>,
    origin: String,
    filter: KeyFilter,
    timeout_ms: u64,
    user_agent: String,
}

impl Retriever {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &RefreshConfig) -> Self {
        Self {
            http_client,
            origin: config.origin_base().to_string(),
            filter: KeyFilter::new(config.prefix.clone(), config.extension.clone()),
            timeout_ms: config.request_timeout_ms,
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn object_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.origin, key.url_path())
    }

    /// Download every key into `staging_dir`, mirroring the key layout below
    /// the prefix. Stops at the first failure.
    ///
    /// Returns the staged paths in key order.
    ///
    /// # Errors
    /// Returns [`RefreshError::Retrieval`] naming the key on any transport
    /// failure or non-2xx status, and [`RefreshError::Io`] when the staging
    /// directory cannot be written.
    pub async fn retrieve<'a, I>(
        &self,
        keys: I,
        staging_dir: &Path,
    ) -> Result<Vec<PathBuf>, RefreshError>
    where
        I: IntoIterator<Item = &'a ObjectKey>,
        I::IntoIter: ExactSizeIterator + Send,
    {
        let keys = keys.into_iter();
        let total = keys.len();
        let mut staged = Vec::with_capacity(total);

        for (index, key) in keys.enumerate() {
            let relative = self
                .filter
                .relative_path(key)
                .ok_or_else(|| RefreshError::Retrieval {
                    key: key.to_string(),
                    cause: String::from("key does not map to a path inside the staging directory"),
                })?;
            let local_path = staging_dir.join(relative);
            if let Some(parent) = local_path.parent() {
                fs::create_dir_all(parent)?;
            }

            info!("[download {}/{}] {}", index + 1, total, key);
            let body = self.fetch(key).await?;
            fs::write(&local_path, &body)?;
            debug!(path = %local_path.display(), bytes = body.len(), "staged object");

            staged.push(local_path);
        }

        Ok(staged)
    }

    async fn fetch(&self, key: &ObjectKey) -> Result<Vec<u8>, RefreshError> {
        let request = HttpRequest::get(self.object_url(key))
            .with_header("user-agent", self.user_agent.as_str())
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| RefreshError::Retrieval {
                key: key.to_string(),
                cause: error.message().to_string(),
            })?;

        if !response.is_success() {
            return Err(RefreshError::Retrieval {
                key: key.to_string(),
                cause: format!("upstream returned status {}", response.status),
            });
        }

        Ok(response.body)
    }
}
