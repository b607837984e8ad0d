#![allow(dead_code)]

use async_trait::async_trait;
use eventbrite_api::app::ports::{RemoteCaller, TransientStore};
use eventbrite_api::common::error::{ApiError, Result};
use eventbrite_api::common::types::Params;
use eventbrite_api::endpoints::EndpointRegistry;
use eventbrite_api::infra::option_store::MemoryOptionStore;
use eventbrite_api::infra::transient_store::MemoryTransientStore;
use eventbrite_api::manager::Manager;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded remote call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub params: Params,
    pub object_id: Option<u64>,
}

/// Remote caller that serves canned responses per endpoint and counts calls.
#[derive(Default)]
pub struct CountingCaller {
    responses: Mutex<HashMap<String, Value>>,
    failing: Mutex<bool>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl CountingCaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: &str, body: Value) {
        self.responses.lock().unwrap().insert(endpoint.to_string(), body);
    }

    pub fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteCaller for CountingCaller {
    async fn call(&self, endpoint: &str, params: &Params, object_id: Option<u64>) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            params: params.clone(),
            object_id,
        });
        if *self.failing.lock().unwrap() {
            return Err(ApiError::Remote {
                status: 500,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| json!({ "events": [], "pagination": {} })))
    }
}

pub struct Harness {
    pub caller: Arc<CountingCaller>,
    pub transients: Arc<MemoryTransientStore>,
    pub options: Arc<MemoryOptionStore>,
    pub manager: Arc<Manager>,
}

pub fn harness() -> Harness {
    let caller = Arc::new(CountingCaller::new());
    let transients = Arc::new(MemoryTransientStore::new());
    let options = Arc::new(MemoryOptionStore::new());
    let manager = Arc::new(Manager::new(
        Arc::new(EndpointRegistry::eventbrite()),
        caller.clone(),
        transients.clone(),
        options.clone(),
    ));
    Harness {
        caller,
        transients,
        options,
        manager,
    }
}

/// A raw event as the API returns it.
pub fn raw_event(id: u64, title: &str) -> Value {
    let venue_id = if id % 2 == 0 { "v2" } else { "v1" };
    json!({
        "id": id.to_string(),
        "name": { "text": title, "html": title },
        "description": { "html": format!("<p>{title}</p>") },
        "url": format!("https://www.eventbrite.com/e/{id}"),
        "listed": true,
        "start": { "timezone": "UTC", "local": "2025-07-01T19:00:00", "utc": "2025-07-01T19:00:00Z" },
        "end": { "timezone": "UTC", "local": "2025-07-01T22:00:00", "utc": "2025-07-01T22:00:00Z" },
        "organizer": { "id": "555", "name": "Parks Dept" },
        "venue": { "id": venue_id, "name": "Park" },
        "category_id": "103"
    })
}

/// One remote page holding events `first..first + count` out of `object_count`.
pub fn listing(first: u64, count: u64, object_count: u64) -> Value {
    let events: Vec<Value> = (first..first + count)
        .map(|id| raw_event(id, &format!("Event {id}")))
        .collect();
    json!({
        "events": events,
        "pagination": {
            "object_count": object_count,
            "page_number": 1,
            "page_size": 50,
            "page_count": object_count.div_ceil(50)
        }
    })
}

/// Transient store whose reads and writes can be made to fail.
#[derive(Default)]
pub struct FlakyTransientStore {
    inner: MemoryTransientStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl FlakyTransientStore {
    pub fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            inner: MemoryTransientStore::new(),
            fail_reads,
            fail_writes,
        }
    }

    pub fn stored(&self) -> usize {
        self.inner.len()
    }
}

impl TransientStore for FlakyTransientStore {
    fn get_transient(&self, key: &str) -> Result<Option<Value>> {
        if self.fail_reads {
            return Err(ApiError::Storage("database is locked".to_string()));
        }
        self.inner.get_transient(key)
    }

    fn set_transient(&self, key: &str, payload: &Value, ttl: Duration) -> Result<()> {
        if self.fail_writes {
            return Err(ApiError::Storage("database is locked".to_string()));
        }
        self.inner.set_transient(key, payload, ttl)
    }

    fn delete_transient(&self, key: &str) -> Result<bool> {
        self.inner.delete_transient(key)
    }
}

/// Manager over `store` with a fresh counting caller.
pub fn manager_with_store(store: Arc<dyn TransientStore>) -> (Arc<CountingCaller>, Arc<Manager>) {
    let caller = Arc::new(CountingCaller::new());
    let manager = Arc::new(Manager::new(
        Arc::new(EndpointRegistry::eventbrite()),
        caller.clone(),
        store,
        Arc::new(MemoryOptionStore::new()),
    ));
    (caller, manager)
}
