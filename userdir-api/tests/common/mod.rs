/// Common test utilities for integration tests
///
/// Builds the full router over a fresh `MemoryUserStore` with two organizations
/// already seeded:
///
/// | Org | User | Role |
/// |---|---|---|
/// | 1 | `root` | admin |
/// | 2 | `boss` | org_admin |
/// | 2 | `member` | readwrite |
///
/// Every seeded user's password is [`PASSWORD`].

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use userdir_api::app::{build_router, AppState};
use userdir_api::config::Config;
use userdir_shared::auth::api_key::generate_api_key;
use userdir_shared::auth::password::hash_password;
use userdir_shared::models::{NewOrganization, NewUser, Role, User};
use userdir_shared::store::{MemoryUserStore, UserStore};

pub const PASSWORD: &str = "correct horse battery staple";

/// A seeded user and its plaintext API key
pub struct Seeded {
    pub user: User,
    pub api_key: String,
}

/// Test context containing the router and its backing store
pub struct TestContext {
    pub store: Arc<MemoryUserStore>,
    pub app: Router,
    pub admin: Seeded,
    pub org_admin: Seeded,
    pub member: Seeded,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_env(&[]).await
    }

    /// Like [`TestContext::new`], with extra configuration variables
    pub async fn with_env(vars: &[(&str, &str)]) -> anyhow::Result<Self> {
        let config = Config::from_lookup(|key| match key {
            "STORE" => Some("memory".to_string()),
            _ => vars
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string()),
        })?;

        let store = Arc::new(MemoryUserStore::new());

        let root_org = store
            .insert_organization(NewOrganization {
                name: "Root".to_string(),
            })
            .await?;
        let acme = store
            .insert_organization(NewOrganization {
                name: "Acme".to_string(),
            })
            .await?;

        let admin = seed_user(&store, "root", root_org.id, Role::Admin).await?;
        let org_admin = seed_user(&store, "boss", acme.id, Role::OrgAdmin).await?;
        let member = seed_user(&store, "member", acme.id, Role::Readwrite).await?;

        let state = AppState::new(store.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            store,
            app,
            admin,
            org_admin,
            member,
        })
    }

    /// Sends a request and returns the status with the parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&body))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get_with_api_key(&self, uri: &str, api_key: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-api-key", api_key)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: impl Into<String>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.into()))
            .unwrap();
        self.send(request).await
    }

    pub async fn user_count(&self) -> i64 {
        self.store.count_users().await.unwrap()
    }
}

/// Inserts a user straight into the store
pub async fn seed_user(
    store: &MemoryUserStore,
    username: &str,
    org_id: i64,
    role: Role,
) -> anyhow::Result<Seeded> {
    let (api_key, api_key_hash) = generate_api_key();
    let user = store
        .insert_user(NewUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password_hash: hash_password(PASSWORD)?,
            api_key_hash,
            org_id,
            role,
        })
        .await?;

    Ok(Seeded { user, api_key })
}
