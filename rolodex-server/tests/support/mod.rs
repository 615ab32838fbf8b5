#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use axum_test::TestServer;
use chrono::Utc;
use rolodex_config::{ConfigLoader, EnvConfig};
use rolodex_core::{
    application::unit_of_work::AppUnitOfWork, auth::CredentialSealer,
    codec::BackendKind,
};
use rolodex_model::{Identity, Role};
use rolodex_server::{AppState, create_app};
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

pub fn build_test_app(backend: BackendKind) -> TestApp {
    let config = ConfigLoader::new()
        .with_env(EnvConfig::from_lookup(|key| match key {
            "ROLODEX_PROFILE" => Some("testing".to_string()),
            _ => None,
        }))
        .load()
        .expect("test configuration")
        .config;

    let sealer = CredentialSealer::with_params(
        "test-pepper",
        "test-token-key",
        Params::new(8, 1, 1, Some(32)).expect("valid argon2 params"),
    )
    .expect("sealer");

    let state = AppState::new(
        Arc::new(config),
        Arc::new(AppUnitOfWork::in_memory(backend)),
        Arc::new(sealer),
    )
    .expect("app state");

    let server = TestServer::new(create_app(state.clone())).unwrap();
    TestApp { server, state }
}

impl TestApp {
    /// Insert an identity holding `role` straight into the store.
    pub async fn seed(&self, email: &str, role: Role) -> Identity {
        let credential = self.state.sealer().seal_password(PASSWORD).unwrap();
        let mut identity = Identity::new(email, credential, Utc::now());
        identity.grant(role);
        self.state
            .unit_of_work()
            .identities
            .insert(&identity)
            .await
            .unwrap();
        identity
    }

    pub async fn token_for(&self, identity: &Identity) -> String {
        let response = self
            .server
            .post("/v1/auth/token")
            .json(&json!({ "id": identity.username, "password": PASSWORD }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("token present")
            .to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
