//! Snapshot retrieval.
//!
//! The pipeline never owns an HTTP client of its own. Callers build a
//! [`SnapshotSource`] once and pass it into every capture, which keeps the
//! transport swappable for tests and avoids process-wide client state.
use std::fmt;
use std::io::{self, Read};
use std::time::Duration;

use thiserror::Error;
use tracing::{trace, warn};

use crate::config::CaptureConfig;

/// Failures while talking to a camera.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: timeout, refused connection, bad URL, TLS.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response started but its body could not be read to the end.
    #[error("reading response body failed: {0}")]
    Body(#[source] io::Error),

    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Client(String),
}

/// A fetched response: the status line and a reader over the body.
pub struct Snapshot {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl Snapshot {
    pub fn new(status: u16, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Anything that can perform `GET url` and hand back the body as a stream.
pub trait SnapshotSource {
    fn fetch(&self, url: &str) -> Result<Snapshot, FetchError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn fetch(&self, url: &str) -> Result<Snapshot, FetchError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP source backed by a single reusable `reqwest` client.
///
/// The timeout is client-wide and covers the whole exchange, so a camera that
/// never answers yields [`FetchError::Http`] instead of a hang.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(cfg: &CaptureConfig) -> Result<Self, FetchError> {
        cfg.validate()
            .map_err(|err| FetchError::Client(err.to_string()))?;

        let timeout = cfg.timeout();
        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);
        if let Some(agent) = cfg.user_agent.as_deref() {
            builder = builder.user_agent(agent.to_owned());
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl SnapshotSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Snapshot, FetchError> {
        trace!(url, timeout_secs = self.timeout.as_secs(), "http_get");
        let response = self.client.get(url).send()?;
        let snapshot = Snapshot::new(response.status().as_u16(), response);
        if !snapshot.is_success() {
            // Body is still saved; validation downstream decides its fate.
            warn!(url, status = snapshot.status, "camera returned non-success status");
        }
        Ok(snapshot)
    }
}
