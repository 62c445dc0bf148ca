//! HTTP client for the churn authority.

use crate::error::{Error, Result};
use churn_core::{ChurnReply, ChurnRequest, ErrorBody};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::debug;

/// Path of the churn endpoint on the authority.
pub const CHURN_PATH: &str = "/api/v1/churn";

/// Default time allowed for one churn exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the authority lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://churner:8090`. A bare `host:port` gets
    /// `https://`; plain `http://` must be asked for explicitly.
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Sends churn requests to one authority. No retries.
#[derive(Clone)]
pub struct AuthorityClient {
    http: Client,
    churn_url: String,
    timeout: Duration,
}

impl AuthorityClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Transport(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            churn_url: format!("{}{}", base_url, CHURN_PATH),
            timeout: config.timeout,
        })
    }

    /// Full URL of the churn endpoint.
    pub fn churn_url(&self) -> &str {
        &self.churn_url
    }

    /// Ask the authority for an admission approval.
    ///
    /// The whole exchange (connect, send, read body) is bounded by the
    /// configured timeout. A timeout means no authorization was obtained.
    pub async fn churn(&self, request: &ChurnRequest) -> Result<ChurnReply> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .unwrap_or(Err(Error::Timeout(self.timeout)));
        debug!(
            "churn call for quorums {:?} to {} finished in {:?} (ok: {})",
            request.quorum_ids(),
            self.churn_url,
            started.elapsed(),
            result.is_ok()
        );
        result
    }

    async fn exchange(&self, request: &ChurnRequest) -> Result<ChurnReply> {
        let response = self
            .http
            .post(&self.churn_url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|e| Error::Protocol(format!("undecodable churn reply: {}", e)));
        }

        let detail = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(error_body) => error_body.error,
            Err(_) => String::from_utf8_lossy(&body).into_owned(),
        };
        if status == StatusCode::FORBIDDEN {
            Err(Error::AdmissionDenied(detail))
        } else {
            Err(Error::Protocol(format!("authority returned {}: {}", status, detail)))
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout)
        } else if err.is_decode() {
            Error::Protocol(err.to_string())
        } else {
            Error::Transport(error_chain(&err))
        }
    }
}

/// `err` followed by each of its sources, so TLS and connect failures say
/// what actually went wrong.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    match trimmed.split_once("://") {
        None if trimmed.is_empty() => Err(Error::InvalidUrl("churner URL is empty".to_string())),
        None => Ok(format!("https://{}", trimmed)),
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http") => {
            Ok(trimmed.to_string())
        }
        Some((scheme, _)) => Err(Error::InvalidUrl(format!(
            "unsupported scheme {:?} in {:?} (expected https or http)",
            scheme, trimmed
        ))),
    }
}
