use crate::app::ports::{HttpClientPort, RemoteRequest};
use crate::common::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Shared, adjustable request timeout.
///
/// Clones share the same setting. [`HttpTimeout::raise`] returns a guard that
/// holds the timeout up while it lives; once the last outstanding guard is
/// dropped the baseline is back in effect, whatever order the guards go in.
#[derive(Clone, Debug)]
pub struct HttpTimeout {
    state: Arc<Mutex<TimeoutState>>,
}

#[derive(Debug)]
struct TimeoutState {
    baseline: u64,
    /// One entry per live guard
    raised: Vec<u64>,
}

impl TimeoutState {
    fn effective(&self) -> u64 {
        self.raised.iter().copied().fold(self.baseline, u64::max)
    }
}

fn lock(state: &Mutex<TimeoutState>) -> MutexGuard<'_, TimeoutState> {
    // The state stays consistent even if a holder panicked.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl HttpTimeout {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimeoutState {
                baseline: timeout.as_millis() as u64,
                raised: Vec::new(),
            })),
        }
    }

    pub fn current(&self) -> Duration {
        Duration::from_millis(lock(&self.state).effective())
    }

    /// Number of guards currently holding the timeout up.
    pub fn active_raises(&self) -> usize {
        lock(&self.state).raised.len()
    }

    /// Raise the timeout to at least `timeout` until the guard is dropped.
    pub fn raise(&self, timeout: Duration) -> TimeoutGuard {
        let wanted = timeout.as_millis() as u64;
        lock(&self.state).raised.push(wanted);
        TimeoutGuard {
            state: Arc::clone(&self.state),
            wanted,
        }
    }
}

#[must_use = "the timeout is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct TimeoutGuard {
    state: Arc<Mutex<TimeoutState>>,
    wanted: u64,
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if let Some(pos) = state.raised.iter().position(|v| *v == self.wanted) {
            state.raised.swap_remove(pos);
        }
    }
}

pub struct ReqwestHttp {
    client: reqwest::Client,
    timeout: HttpTimeout,
}

impl ReqwestHttp {
    pub fn new(default_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("eventbrite_api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            timeout: HttpTimeout::new(default_timeout),
        })
    }
}

/// Pull a readable message out of an Eventbrite error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error_description")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn send(&self, request: RemoteRequest) -> Result<Value> {
        let builder = if request.method == Method::GET {
            self.client.get(&request.url).query(request.params.as_slice())
        } else if request.method == Method::POST {
            self.client.post(&request.url).form(request.params.as_slice())
        } else {
            return Err(ApiError::MethodNotImplemented {
                method: request.method.to_string(),
            });
        };

        tracing::info!("HTTP {} request to: {}", request.method, request.url);
        let resp = builder
            .bearer_auth(&request.bearer_token)
            .timeout(self.timeout.current())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!("HTTP response: status={}, size={} bytes", status.as_u16(), body.len());

        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn timeout(&self) -> &HttpTimeout {
        &self.timeout
    }
}
