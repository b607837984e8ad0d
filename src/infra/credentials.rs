use crate::app::ports::CredentialProvider;
use crate::common::types::AccessToken;
use std::collections::HashMap;
use std::sync::RwLock;

/// Token store keyed by token identifier
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: AccessToken) {
        self.tokens.write().unwrap().insert(token.id.clone(), token);
    }
}

impl CredentialProvider for InMemoryTokenStore {
    fn get_token(&self, token_id: &str) -> Option<AccessToken> {
        self.tokens.read().unwrap().get(token_id).cloned()
    }
}
