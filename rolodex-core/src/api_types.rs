use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope wrapped around every successful JSON response body.
///
/// Failures are rendered by the server's error type instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

/// Credentials exchanged for a bearer token. `id` is the external handle.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub id: String,
    pub password: String,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub id: String,
    pub expires_at: DateTime<Utc>,
}
