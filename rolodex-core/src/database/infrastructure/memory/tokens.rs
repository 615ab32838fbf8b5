use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolodex_model::AccessToken;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::ports::tokens::TokenStore;
use crate::error::{Result, RolodexError};

/// [`TokenStore`] keyed by digest.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn issue(&self, token: &AccessToken) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.digest) {
            return Err(RolodexError::Conflict(
                "access token already issued".to_string(),
            ));
        }
        tokens.insert(token.digest.clone(), token.clone());
        Ok(())
    }

    async fn resolve(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .get(digest)
            .filter(|token| !token.is_expired(now))
            .map(|token| token.identity_id))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired(now));
        Ok((before - tokens.len()) as u64)
    }
}
