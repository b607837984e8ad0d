use crate::common::error::Result;
use crate::common::types::{AccessToken, Params};
use crate::infra::http_client::HttpTimeout;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

// Remote-side ports
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn send(&self, request: RemoteRequest) -> Result<Value>;

    /// Timeout applied to every request this client sends.
    fn timeout(&self) -> &HttpTimeout;
}

#[derive(Clone, Debug)]
pub struct RemoteRequest {
    pub method: Method,
    pub url: String,
    /// Query string for GET, form body for POST
    pub params: Params,
    pub bearer_token: String,
}

/// Performs one remote call for a validated endpoint.
#[async_trait]
pub trait RemoteCaller: Send + Sync {
    async fn call(&self, endpoint: &str, params: &Params, object_id: Option<u64>) -> Result<Value>;
}

/// Looks up access tokens by their stored identifier.
pub trait CredentialProvider: Send + Sync {
    fn get_token(&self, token_id: &str) -> Option<AccessToken>;
}

// Persistence ports
pub trait TransientStore: Send + Sync {
    /// Unexpired payload stored under `key`, if any.
    fn get_transient(&self, key: &str) -> Result<Option<Value>>;
    fn set_transient(&self, key: &str, payload: &Value, ttl: Duration) -> Result<()>;
    fn delete_transient(&self, key: &str) -> Result<bool>;
}

pub trait OptionStore: Send + Sync {
    fn get_option(&self, name: &str) -> Result<Option<Value>>;
    fn update_option(&self, name: &str, value: &Value) -> Result<()>;
    fn delete_option(&self, name: &str) -> Result<bool>;
}
