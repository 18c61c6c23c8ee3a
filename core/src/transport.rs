//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the seam between the pure façade and real I/O. It is
//! blocking on purpose: `MailClient` moves each call onto tokio's blocking
//! pool, and tests can swap in a recording transport without a runtime.
//!
//! `UreqTransport` disables ureq's status-code-as-error behaviour so 4xx/5xx
//! responses come back as data and the façade decides what they mean.

use std::time::Duration;

use tracing::debug;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder, SendBody};

use crate::config::{ClientConfig, DEFAULT_MAX_RESPONSE_BYTES};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::progress::ProgressReader;

/// Upload progress hook: `(bytes sent so far, total bytes)`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, u64);

pub trait Transport: Send + Sync + 'static {
    /// Perform one round-trip. Non-2xx statuses are `Ok`; only failures to
    /// get a response at all are `Err`.
    fn execute(&self, request: HttpRequest, progress: Option<ProgressFn<'_>>) -> Result<HttpResponse, ApiError>;
}

/// Blocking HTTP transport backed by a shared ureq agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    max_response_bytes: u64,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None, DEFAULT_MAX_RESPONSE_BYTES)
    }
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>, max_response_bytes: u64) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            agent,
            max_response_bytes,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout, config.max_response_bytes)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest, progress: Option<ProgressFn<'_>>) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.path.as_str();
        debug!(method = method.as_str(), %url, "sending request");

        let result = match (method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_params(self.agent.get(url), &request).call(),
            (HttpMethod::Delete, None) => with_params(self.agent.delete(url), &request).call(),
            (HttpMethod::Delete, Some(body)) => {
                send(with_params(self.agent.delete(url).force_send_body(), &request), body, progress)
            }
            (HttpMethod::Post, Some(body)) => send(with_params(self.agent.post(url), &request), body, progress),
            (HttpMethod::Post, None) => with_params(self.agent.post(url), &request).send_empty(),
            (HttpMethod::Put, Some(body)) => send(with_params(self.agent.put(url), &request), body, progress),
            (HttpMethod::Put, None) => with_params(self.agent.put(url), &request).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(method = method.as_str(), %url, status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

fn with_params<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: &[u8],
    progress: Option<ProgressFn<'_>>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match progress {
        Some(on_progress) => {
            let mut reader = ProgressReader::new(body, body.len() as u64, on_progress);
            builder.send(SendBody::from_reader(&mut reader))
        }
        None => builder.send(body),
    }
}
