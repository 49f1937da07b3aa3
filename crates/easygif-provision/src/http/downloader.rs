//! Redirect-following, fully buffered HTTP downloads.
//!
//! The client is built with automatic redirects disabled; [`Downloader::fetch`]
//! walks the redirect chain itself so the hop bound and the `location` checks
//! are explicit. Once a terminal response arrives its shape is validated before
//! a single body byte is read.

use std::io::{ErrorKind, Read};
use std::time::Instant;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use super::config::DownloadConfig;
use crate::progress::{ProgressSink, ProgressTracker};

/// The only content type release assets are accepted with.
pub const OCTET_STREAM: &str = "application/octet-stream";

const CHUNK_SIZE: usize = 64 * 1024;
// Upper bound for trusting content-length when preallocating.
const MAX_PREALLOC: u64 = 256 * 1024 * 1024;

/// Coarse failure classes reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TooManyRedirects,
    InvalidLocation,
    InvalidResponse,
    Generic,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Too many redirects (more than {limit}) for {url}")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("Invalid redirect location from {url}")]
    InvalidLocation { url: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Transfer from {url} interrupted: {source}")]
    Stream {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl DownloadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DownloadError::TooManyRedirects { .. } => FailureKind::TooManyRedirects,
            DownloadError::InvalidLocation { .. } => FailureKind::InvalidLocation,
            DownloadError::InvalidResponse { .. } => FailureKind::InvalidResponse,
            DownloadError::InvalidUrl { .. }
            | DownloadError::Request { .. }
            | DownloadError::Stream { .. }
            | DownloadError::Client(_) => FailureKind::Generic,
        }
    }
}

/// Blocking downloader for release assets.
pub struct Downloader {
    client: Client,
    max_redirects: u32,
}

impl Downloader {
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(&DownloadConfig::default())
    }

    pub fn with_config(config: &DownloadConfig) -> Result<Self, DownloadError> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);

        if let Some(proxy_url) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            max_redirects: config.max_redirects,
        })
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    /// Download `url` into memory, following at most `max_redirects` redirects.
    pub fn fetch(&self, url: &str, sink: &mut dyn ProgressSink) -> Result<Vec<u8>, DownloadError> {
        let (final_url, response) = self.resolve(url)?;

        let total = check_shape(response.status(), response.headers()).map_err(|reason| {
            DownloadError::InvalidResponse {
                url: final_url.to_string(),
                reason,
            }
        })?;

        stream_body(response, final_url.as_str(), total, sink)
    }

    /// Walk the redirect chain until a non-redirect response arrives.
    fn resolve(&self, url: &str) -> Result<(Url, Response), DownloadError> {
        let mut current = Url::parse(url).map_err(|source| DownloadError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let mut hops = 0;

        loop {
            log::debug!("HTTP GET {} (hop {})", current, hops);
            let response = self
                .client
                .get(current.clone())
                .send()
                .map_err(|source| DownloadError::Request {
                    url: current.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_redirection() {
                log::debug!("HTTP {} {}", status.as_u16(), current);
                return Ok((current, response));
            }

            if hops >= self.max_redirects {
                return Err(DownloadError::TooManyRedirects {
                    url: url.to_string(),
                    limit: self.max_redirects,
                });
            }

            current = next_location(&current, response.headers())?;
            hops += 1;
        }
    }
}

fn next_location(current: &Url, headers: &HeaderMap) -> Result<Url, DownloadError> {
    let invalid = || DownloadError::InvalidLocation {
        url: current.to_string(),
    };

    let location = headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(invalid)?;

    current.join(location).map_err(|_| invalid())
}

/// Validate a terminal response, returning its announced length.
fn check_shape(status: StatusCode, headers: &HeaderMap) -> Result<u64, String> {
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !content_type.trim().eq_ignore_ascii_case(OCTET_STREAM) {
        return Err(format!("unexpected content-type {:?}", content_type));
    }

    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_length)
        .ok_or_else(|| "missing or malformed content-length".to_string())
}

fn parse_content_length(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn stream_body(
    mut response: Response,
    url: &str,
    total: u64,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<u8>, DownloadError> {
    let mut payload = Vec::with_capacity(total.min(MAX_PREALLOC) as usize);
    let mut tracker = ProgressTracker::new(total, Instant::now());
    let mut buf = vec![0u8; CHUNK_SIZE];

    sink.begin(total);
    loop {
        let read = match response.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                sink.abandon();
                return Err(DownloadError::Stream {
                    url: url.to_string(),
                    source,
                });
            }
        };

        payload.extend_from_slice(&buf[..read]);
        let sample = tracker.record(read, Instant::now());
        sink.update(&sample);
    }

    if tracker.bytes_received() != total {
        log::warn!(
            "{} announced {} bytes but sent {}",
            url,
            total,
            tracker.bytes_received()
        );
    }
    sink.finish(&tracker.sample_at(Instant::now()));

    Ok(payload)
}
