use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted bearer token. Only the digest of the token is kept; the
/// token itself is handed to the client once and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub digest: String,
    pub identity_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let token = AccessToken {
            digest: "d".into(),
            identity_id: Uuid::new_v4(),
            expires_at: now,
        };
        assert!(token.is_expired(now));
        assert!(!token.is_expired(now - Duration::seconds(1)));
    }
}
