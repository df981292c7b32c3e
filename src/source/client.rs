//! Blocking HTTP client that spaces requests out and bounds how long each may take.
//!
//! Every request the adapter makes goes through [PoliteClient]; there is no other channel.

use crate::source::error::SourceError;
use crate::source::extract::Document;
use crate::source::request::Request;
use std::time::{Duration, Instant};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;
/// The site tolerates roughly one request every three seconds.
const DEFAULT_INTERVAL_SECS: u64 = 3;
const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client that enforces a minimum interval between requests.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
    interval: Duration,
    last_request: Option<Instant>,
}

impl PoliteClient {
    /// Build a polite client with default User-Agent, timeouts, and interval.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Send a GET for `request`. Sleeps until the interval has passed since the last request.
    pub fn execute(
        &mut self,
        request: &Request,
    ) -> Result<reqwest::blocking::Response, SourceError> {
        self.wait_interval();
        tracing::debug!(url = %request.url, "GET");
        let result = self
            .inner
            .get(request.url.clone())
            .headers(request.headers.clone())
            .send();
        self.last_request = Some(Instant::now());
        let response = result.map_err(|e| SourceError::Network {
            url: request.url.to_string(),
            source: e,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                url: request.url.to_string(),
            });
        }
        Ok(response)
    }

    /// Fetch and parse an HTML document. The document is located at the final (post-redirect) URL.
    pub fn fetch_document(&mut self, request: &Request) -> Result<Document, SourceError> {
        let response = self.execute(request)?;
        let location = response.url().clone();
        let body = response
            .text()
            .map_err(|e| SourceError::BodyRead { source: e })?;
        Ok(Document::parse(&body, location))
    }

    /// Fetch a raw body, e.g. an image.
    pub fn fetch_bytes(&mut self, request: &Request) -> Result<Vec<u8>, SourceError> {
        let response = self.execute(request)?;
        let bytes = response
            .bytes()
            .map_err(|e| SourceError::BodyRead { source: e })?;
        Ok(bytes.to_vec())
    }

    fn wait_interval(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "throttling");
                std::thread::sleep(wait);
            }
        }
    }
}

/// Builder for PoliteClient with optional User-Agent, interval, and timeouts.
#[derive(Debug)]
pub struct PoliteClientBuilder {
    user_agent: Option<String>,
    interval_secs: u64,
    timeout_secs: u64,
    connect_timeout_secs: u64,
}

impl Default for PoliteClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl PoliteClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Minimum seconds between two requests. Default 3.
    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Whole-request timeout (connect, write, and read) in seconds. Default 60.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<PoliteClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(PoliteClient {
            inner,
            interval: Duration::from_secs(self.interval_secs),
            last_request: None,
        })
    }
}
