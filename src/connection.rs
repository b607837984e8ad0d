//! Credential lifecycle notifications.
//!
//! The credential provider reports verified and revoked connections to a
//! [`ConnectionHub`], which forwards them to every subscribed observer.

use crate::common::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub trait ConnectionObserver: Send + Sync {
    fn on_connection_verified(&self, _service: &str, _token_id: &str) -> Result<()> {
        Ok(())
    }

    fn on_connection_revoked(&self, _service: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct ConnectionHub {
    observers: Vec<Arc<dyn ConnectionObserver>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ConnectionObserver>) {
        self.observers.push(observer);
    }

    /// Notify all observers. A failing observer is logged and does not stop the rest.
    pub fn connection_verified(&self, service: &str, token_id: &str) -> usize {
        info!(service, token_id, "Connection verified");
        self.observers
            .iter()
            .filter_map(|o| o.on_connection_verified(service, token_id).err())
            .inspect(|e| warn!("Observer failed on connection verified: {}", e))
            .count()
    }

    pub fn connection_revoked(&self, service: &str) -> usize {
        info!(service, "Connection revoked");
        self.observers
            .iter()
            .filter_map(|o| o.on_connection_revoked(service).err())
            .inspect(|e| warn!("Observer failed on connection revoked: {}", e))
            .count()
    }
}
