//! Server test utilities.

use axum::http::StatusCode;
use std::sync::Arc;
use stockroom_core::config::AppConfig;
use stockroom_server::{AppState, create_router};
use stockroom_store::{InventoryStore, SqliteStore};
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server backed by a temporary SQLite database.
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let db_path = temp_dir.path().join("inventory.db");
        let store: Arc<dyn InventoryStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create inventory store"),
        );

        let state = AppState::new(AppConfig::for_testing(), store);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying store.
    pub fn store(&self) -> Arc<dyn InventoryStore> {
        self.state.store.clone()
    }

    /// Register a user through the API and return its access token.
    pub async fn signup(&self, email: &str) -> String {
        let (status, body) = json_request(
            &self.router,
            "POST",
            "/api/auth/signup",
            Some(serde_json::json!({
                "name": "Test User",
                "email": email,
                "password": "correct horse battery staple",
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");
        body.get("token")
            .and_then(|v| v.as_str())
            .expect("signup response missing token")
            .to_string()
    }
}

/// Make a JSON request against the router and decode the response body.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    auth_token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, body_json)
}
