use crate::error::{FetchError, Result};
use crate::result::FetchResult;
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:78.0) Gecko/20100101 Firefox/78.0";
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sequential HTTP GET with a fixed pause after every request.
///
/// The pause happens exactly once per `fetch` or `fetch_text` call, whether
/// the request succeeded or not, so the request rate against the remote site
/// stays bounded no matter what the caller does with the result.
pub struct Transport {
    client: Client,
    delay: Duration,
    pauses: AtomicUsize,
}

impl Transport {
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_DELAY, DEFAULT_TIMEOUT)
    }

    pub fn with_settings(user_agent: &str, delay: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            delay,
            pauses: AtomicUsize::new(0),
        })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of post-request pauses taken so far; one per request.
    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::Relaxed)
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchResult> {
        let outcome = self.fetch_bytes(url).await;
        self.pause().await;
        outcome
    }

    /// Fetch and decode the body as text using the charset named in the
    /// response `Content-Type`, falling back to UTF-8.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let outcome = match self.send(url).await {
            Ok(response) => match response.text().await {
                Ok(text) => {
                    info!("Successfully downloaded data for {}", url);
                    Ok(text)
                }
                Err(e) => {
                    error!("Reading body of {} failed: {}", url, e);
                    Err(FetchError::Request(e))
                }
            },
            Err(e) => Err(e),
        };
        self.pause().await;
        outcome
    }

    async fn fetch_bytes(&self, url: &str) -> Result<FetchResult> {
        let response = self.send(url).await?;
        let status = response.status();
        let headers = response.headers().clone();

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                error!("Reading body of {} failed: {}", url, e);
                return Err(FetchError::Request(e));
            }
        };

        info!("Successfully downloaded data for {}", url);
        Ok(FetchResult::new(
            url.to_string(),
            status.as_u16(),
            &headers,
            body,
        ))
    }

    /// Issue the GET and turn a non-2xx status into an error. The body of a
    /// successful response is left unread.
    async fn send(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Request for {} failed: {}", url, e);
                return Err(FetchError::Request(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Failed to download data for {} (HTTP {}): {}",
                url,
                status.as_u16(),
                body
            );
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
