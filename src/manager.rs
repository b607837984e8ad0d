//! Cached access to the Eventbrite API.
//!
//! Every request is validated against the endpoint registry, then served from
//! the transient store when possible. Successful responses are stored for the
//! configured TTL and their keys registered so a revoked connection can flush
//! them all.

use crate::app::ports::{OptionStore, RemoteCaller, TransientStore};
use crate::common::constants::{
    DEFAULT_CACHE_TTL_SECS, EVENT_DETAILS, EVENT_SEARCH, MIN_EVENT_ID_DIGITS, SERVICE_NAME,
    TOKEN_OPTION, TRANSIENTS_OPTION, TRANSIENT_PREFIX, USER_OWNED_EVENTS,
};
use crate::common::error::{ApiError, Result};
use crate::common::types::{ApiResults, Pagination, Params};
use crate::connection::ConnectionObserver;
use crate::endpoints::EndpointRegistry;
use crate::observability::{emit_counter, emit_endpoint_counter, MetricName};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Cache key for an endpoint and its parameters.
///
/// The digest covers the endpoint name followed by the parameter values in
/// insertion order, so the same parameters inserted in a different order give
/// a different key.
pub fn cache_key(endpoint: &str, params: &Params) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(params.concat_values().as_bytes());
    format!("{}{}", TRANSIENT_PREFIX, hex::encode(hasher.finalize()))
}

/// Only positive integers are usable object IDs.
pub fn normalize_object_id(object_id: Option<i64>) -> Option<u64> {
    object_id.filter(|id| *id > 0).map(|id| id as u64)
}

pub struct Manager {
    registry: Arc<EndpointRegistry>,
    caller: Arc<dyn RemoteCaller>,
    transients: Arc<dyn TransientStore>,
    options: Arc<dyn OptionStore>,
    ttl: Duration,
}

impl Manager {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        caller: Arc<dyn RemoteCaller>,
        transients: Arc<dyn TransientStore>,
        options: Arc<dyn OptionStore>,
    ) -> Self {
        Self {
            registry,
            caller,
            transients,
            options,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Make a call to the API, or return a cached response.
    #[instrument(skip(self, params), fields(params = params.len()))]
    pub async fn request(
        &self,
        endpoint: &str,
        params: &Params,
        object_id: Option<i64>,
        force: bool,
    ) -> Result<Value> {
        self.registry.check(endpoint, params)?;
        let object_id = normalize_object_id(object_id);
        let key = cache_key(endpoint, params);

        if !force {
            match self.transients.get_transient(&key) {
                Ok(Some(cached)) => {
                    debug!("Cache hit for {}", key);
                    emit_endpoint_counter(MetricName::CacheHits, endpoint);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Cache read for {} failed, treating as a miss: {}", key, e);
                    emit_endpoint_counter(MetricName::CacheErrors, endpoint);
                }
            }
            emit_endpoint_counter(MetricName::CacheMisses, endpoint);
        }

        let response = self.caller.call(endpoint, params, object_id).await?;

        // A response that could not be cached is still a good response.
        match self.store(&key, &response) {
            Ok(()) => {
                emit_counter(MetricName::CacheStores, 1);
                debug!("Cached {} response under {} for {:?}", endpoint, key, self.ttl);
            }
            Err(e) => {
                warn!("Could not cache {} response under {}: {}", endpoint, key, e);
                emit_endpoint_counter(MetricName::CacheErrors, endpoint);
            }
        }

        Ok(response)
    }

    fn store(&self, key: &str, response: &Value) -> Result<()> {
        self.transients.set_transient(key, response, self.ttl)?;
        self.register_transient(key)
    }

    /// Search for public events.
    pub async fn do_event_search(&self, params: &Params, force: bool) -> Result<ApiResults> {
        let response = self.request(EVENT_SEARCH, params, None, force).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Events owned by the connected user, live ones unless a status was given.
    pub async fn get_user_owned_events(&self, params: &Params, force: bool) -> Result<ApiResults> {
        let mut params = params.clone();
        if !params.contains_key("status") {
            params.set("status", "live");
        }
        let response = self.request(USER_OWNED_EVENTS, &params, None, force).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// A single event, wrapped as a one-element result set.
    pub async fn get_event(&self, id: &str, force: bool) -> Result<ApiResults> {
        let id = id.trim();
        if id.len() < MIN_EVENT_ID_DIGITS || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ApiError::InvalidObjectId(id.to_string()));
        }
        let numeric: i64 = id.parse().map_err(|_| ApiError::InvalidObjectId(id.to_string()))?;

        // `p` keeps cache entries per event apart; the ID itself travels in the URL path.
        let params = Params::new().with("p", numeric.to_string());
        let event = self.request(EVENT_DETAILS, &params, Some(numeric), force).await?;

        Ok(ApiResults {
            events: vec![event],
            pagination: Pagination::single(),
        })
    }

    /// Keys currently registered for bulk invalidation.
    pub fn registered_transients(&self) -> Result<Vec<String>> {
        let keys = match self.options.get_option(TRANSIENTS_OPTION)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        Ok(keys)
    }

    fn register_transient(&self, key: &str) -> Result<()> {
        let mut keys = self.registered_transients()?;
        if keys.iter().any(|k| k == key) {
            return Ok(());
        }
        keys.push(key.to_string());
        self.options.update_option(TRANSIENTS_OPTION, &Value::from(keys))
    }

    /// Delete every registered cache entry and clear the registry.
    pub fn flush_transients(&self) -> Result<usize> {
        let keys = self.registered_transients()?;
        if keys.is_empty() {
            return Ok(0);
        }

        for key in &keys {
            self.transients.delete_transient(key)?;
        }
        self.options.delete_option(TRANSIENTS_OPTION)?;

        info!("Flushed {} cached Eventbrite responses", keys.len());
        emit_counter(MetricName::CacheFlushes, 1);
        emit_counter(MetricName::CacheKeysFlushed, keys.len() as u64);
        Ok(keys.len())
    }

    /// Remove everything this crate persisted: cached responses and options.
    pub fn uninstall(&self) -> Result<()> {
        // Flushing leaves an empty or malformed registry option in place.
        self.flush_transients()?;
        self.options.delete_option(TRANSIENTS_OPTION)?;
        self.options.delete_option(TOKEN_OPTION)?;
        Ok(())
    }
}

impl ConnectionObserver for Manager {
    fn on_connection_revoked(&self, service: &str) -> Result<()> {
        if service != SERVICE_NAME {
            return Ok(());
        }
        self.flush_transients().map(|_| ())
    }
}
