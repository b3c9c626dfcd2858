//! Strategies for loading a locale's translation payload.
//!
//! A payload is a flat JSON object of strings, stored as `{locale}.json`
//! either in a local directory or under an HTTP base URL.

use crate::error::{I18nError, Result};
use crate::i18n::TranslationMap;
use crate::retry::{with_retry_if, RetryConfig};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Conventional directory holding `{locale}.json` payloads.
pub const DEFAULT_ASSETS_DIR: &str = "assets/locales";

/// Injected strategy that loads the translations for a locale.
pub type FetchLocaleFn =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<TranslationMap>> + Send + Sync>;

/// Wrap an async closure as a [`FetchLocaleFn`].
pub fn fetch_fn<F, Fut>(f: F) -> FetchLocaleFn
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TranslationMap>> + Send + 'static,
{
    Arc::new(move |locale| f(locale).boxed())
}

/// Reads `{dir}/{locale}.json` from the filesystem.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{}.json", locale))
    }

    pub async fn fetch(&self, locale: &str) -> Result<TranslationMap> {
        let path = self.path_for(locale);
        if !is_file_stem(locale) {
            return Err(I18nError::Io {
                locale: locale.to_string(),
                path: path.display().to_string(),
                source: Arc::new(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "locale must be a plain file name",
                )),
            });
        }
        debug!("Reading translations for '{}' from {}", locale, path.display());

        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| I18nError::Io {
                locale: locale.to_string(),
                path: path.display().to_string(),
                source: Arc::new(e),
            })?;

        let map = parse_payload(locale, &body)?;
        info!("Loaded {} translations for '{}'", map.len(), locale);
        Ok(map)
    }

    pub fn into_fetch_fn(self) -> FetchLocaleFn {
        let fetcher = Arc::new(self);
        fetch_fn(move |locale| {
            let fetcher = Arc::clone(&fetcher);
            async move { fetcher.fetch(&locale).await }
        })
    }
}

impl Default for DirFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_ASSETS_DIR)
    }
}

/// Downloads `{base_url}/{locale}.json`.
///
/// Failures are returned as-is unless a [`RetryConfig`] is attached, in which
/// case network errors and 5xx responses are retried with backoff.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    retry: Option<RetryConfig>,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn url_for(&self, locale: &str) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), locale)
    }

    pub async fn fetch(&self, locale: &str) -> Result<TranslationMap> {
        let map = match &self.retry {
            Some(retry) => {
                with_retry_if(
                    retry,
                    &format!("Fetch locale '{}'", locale),
                    || self.fetch_once(locale),
                    I18nError::is_retryable,
                )
                .await?
            }
            None => self.fetch_once(locale).await?,
        };

        info!("Loaded {} translations for '{}'", map.len(), locale);
        Ok(map)
    }

    async fn fetch_once(&self, locale: &str) -> Result<TranslationMap> {
        let url = self.url_for(locale);
        debug!("Fetching translations for '{}' from {}", locale, url);

        let http_error = |status: Option<u16>, message: String| I18nError::Http {
            locale: locale.to_string(),
            url: url.clone(),
            status,
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| http_error(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(http_error(Some(status.as_u16()), format!("status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| http_error(None, e.to_string()))?;

        parse_payload(locale, &body)
    }

    pub fn into_fetch_fn(self) -> FetchLocaleFn {
        let fetcher = Arc::new(self);
        fetch_fn(move |locale| {
            let fetcher = Arc::clone(&fetcher);
            async move { fetcher.fetch(&locale).await }
        })
    }
}

/// A locale names a file inside the assets dir, never a path out of it.
fn is_file_stem(locale: &str) -> bool {
    !locale.is_empty() && !locale.contains(['/', '\\']) && !locale.contains("..")
}

fn parse_payload(locale: &str, body: &str) -> Result<TranslationMap> {
    serde_json::from_str(body).map_err(|e| I18nError::Parse {
        locale: locale.to_string(),
        source: Arc::new(e),
    })
}
