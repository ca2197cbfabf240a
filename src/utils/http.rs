use crate::config::Config;
use crate::error::ExportError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Connect and read timeout for every call to the API
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Total attempts for a request that keeps hitting read timeouts
pub const MAX_ATTEMPTS: u32 = 3;

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    "MochiVocab"
}

/// Delay to wait after failed attempt `attempt` (0-based): 1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Outcome of a single failed attempt
#[derive(Debug)]
pub enum AttemptError {
    /// The server stopped answering mid-request. Worth another try.
    ReadTimeout,
    Fatal(ExportError),
}

impl From<reqwest::Error> for AttemptError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() && !error.is_connect() {
            AttemptError::ReadTimeout
        } else {
            AttemptError::Fatal(ExportError::Request(error))
        }
    }
}

/// Run `attempt_fn` until it succeeds, fails fatally, or has timed out
/// `MAX_ATTEMPTS` times, sleeping `backoff_delay(attempt)` between tries.
pub async fn retry_on_read_timeout<T, F, Fut>(
    operation: &str,
    mut attempt_fn: F,
) -> Result<T, ExportError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    for attempt in 0..MAX_ATTEMPTS {
        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::ReadTimeout) if attempt + 1 < MAX_ATTEMPTS => {
                let delay = backoff_delay(attempt);
                warn!(
                    "Read timeout on attempt {}/{} ({}). Retrying in {}s...",
                    attempt + 1,
                    MAX_ATTEMPTS,
                    operation,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
            Err(AttemptError::ReadTimeout) => {}
        }
    }

    Err(ExportError::Timeout {
        operation: operation.to_string(),
        attempts: MAX_ATTEMPTS,
    })
}

/// Something that can GET a page of the API and hand back its body.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `url`. `operation` names the request in errors and logs.
    async fn get_text(&self, url: &Url, operation: &str) -> Result<String, ExportError>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for &S {
    async fn get_text(&self, url: &Url, operation: &str) -> Result<String, ExportError> {
        (**self).get_text(url, operation).await
    }
}

/// Authenticated client for the flashcard API.
///
/// One instance is created per resolve/fetch operation; dropping it closes
/// the underlying connection pool.
pub struct HttpClient {
    client: Client,
    api_key: String,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, ExportError> {
        let client = Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .read_timeout(REQUEST_TIMEOUT)
            .user_agent(get_user_agent())
            .build()?;

        Ok(Self::from_client(client, &config.api_key))
    }

    fn from_client(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
        }
    }

    async fn attempt(&self, url: &Url, operation: &str) -> Result<String, AttemptError> {
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Fatal(ExportError::Http {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn get_text(&self, url: &Url, operation: &str) -> Result<String, ExportError> {
        debug!("GET {}", url);
        retry_on_read_timeout(operation, |_| self.attempt(url, operation)).await
    }
}
