//! Builds and sends signed requests to the Eventbrite API.

use crate::app::ports::{CredentialProvider, HttpClientPort, OptionStore, RemoteCaller, RemoteRequest};
use crate::common::constants::{REMOTE_CALL_TIMEOUT_SECS, SERVICE_NAME, TOKEN_OPTION};
use crate::common::error::{ApiError, Result};
use crate::common::types::{AccessToken, Params};
use crate::connection::ConnectionObserver;
use crate::endpoints::{EndpointRegistry, EndpointSpec};
use crate::observability::{emit_endpoint_counter, emit_histogram, MetricName};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub struct Caller {
    registry: Arc<EndpointRegistry>,
    base_url: String,
    http: Arc<dyn HttpClientPort>,
    credentials: Arc<dyn CredentialProvider>,
    options: Arc<dyn OptionStore>,
    call_timeout: Duration,
}

impl Caller {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        base_url: impl Into<String>,
        http: Arc<dyn HttpClientPort>,
        credentials: Arc<dyn CredentialProvider>,
        options: Arc<dyn OptionStore>,
    ) -> Self {
        Self {
            registry,
            base_url: base_url.into(),
            http,
            credentials,
            options,
            call_timeout: Duration::from_secs(REMOTE_CALL_TIMEOUT_SECS),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// The token for the stored token identifier, if both exist.
    pub fn current_token(&self) -> Option<AccessToken> {
        let token_id = match self.options.get_option(TOKEN_OPTION) {
            Ok(Some(Value::String(id))) if !id.is_empty() => id,
            Ok(_) => return None,
            Err(e) => {
                warn!("Could not read stored token id: {}", e);
                return None;
            }
        };
        self.credentials.get_token(&token_id)
    }

    pub fn has_active_connection(&self) -> bool {
        self.current_token().is_some()
    }

    /// Concrete URL for `spec`, with the object ID appended as a path segment.
    pub fn endpoint_url(&self, spec: &EndpointSpec, token: &AccessToken, object_id: Option<u64>) -> String {
        let user_id = token.user_id.as_deref().unwrap_or("me");
        let path = spec.path.replace("{user_id}", user_id);
        let mut url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        if let Some(id) = object_id.filter(|id| *id > 0) {
            if !url.ends_with('/') {
                url.push('/');
            }
            url.push_str(&id.to_string());
        }
        url
    }
}

#[async_trait]
impl RemoteCaller for Caller {
    #[instrument(skip(self, params), fields(params = params.len()))]
    async fn call(&self, endpoint: &str, params: &Params, object_id: Option<u64>) -> Result<Value> {
        let token = self.current_token().ok_or_else(ApiError::no_token)?;
        let spec = self
            .registry
            .get(endpoint)
            .ok_or_else(|| ApiError::UnknownEndpoint(endpoint.to_string()))?;

        if spec.method != Method::GET && spec.method != Method::POST {
            return Err(ApiError::MethodNotImplemented {
                method: spec.method.to_string(),
            });
        }

        let request = RemoteRequest {
            method: spec.method.clone(),
            url: self.endpoint_url(spec, &token, object_id),
            params: params.clone(),
            bearer_token: token.access_token,
        };

        // Eventbrite is slower than the client's default timeout allows for.
        let _timeout = self.http.timeout().raise(self.call_timeout);
        debug!("Calling {} with timeout {:?}", request.url, self.http.timeout().current());

        let started = Instant::now();
        let result = self.http.send(request).await;
        emit_histogram(MetricName::RemoteCallDuration, started.elapsed().as_secs_f64());

        match &result {
            Ok(_) => emit_endpoint_counter(MetricName::RemoteCallsSuccess, endpoint),
            Err(e) => {
                warn!("Remote call to {} failed: {}", endpoint, e);
                emit_endpoint_counter(MetricName::RemoteCallsError, endpoint);
            }
        }
        result
    }
}

impl ConnectionObserver for Caller {
    fn on_connection_verified(&self, service: &str, token_id: &str) -> Result<()> {
        if service != SERVICE_NAME {
            return Ok(());
        }
        info!("Storing token id for {}", SERVICE_NAME);
        self.options.update_option(TOKEN_OPTION, &Value::String(token_id.to_string()))
    }

    fn on_connection_revoked(&self, service: &str) -> Result<()> {
        if service != SERVICE_NAME {
            return Ok(());
        }
        info!("Forgetting token id for {}", SERVICE_NAME);
        self.options.delete_option(TOKEN_OPTION).map(|_| ())
    }
}
