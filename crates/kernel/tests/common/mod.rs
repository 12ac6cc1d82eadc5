#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Everything runs against the REAL kernel code over the in-memory store, so
//! no database is required. Each test builds its own [`TestApp`].

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use roster_kernel::catalog::LocationCatalog;
use roster_kernel::config::SearchSettings;
use roster_kernel::models::NewProvider;
use roster_kernel::routes;
use roster_kernel::search::MemoryProviderStore;
use roster_kernel::state::AppState;
use roster_test_utils::{LOCATIONS_TOML, TestProvider};

/// Convert a fixture into the kernel's insert type.
pub fn new_provider(p: &TestProvider) -> NewProvider {
    NewProvider {
        id: Some(p.id),
        display_name: p.display_name.clone(),
        city: p.city.clone(),
        district: p.district.clone(),
        bio: p.bio.clone(),
        age: p.age,
        hair_color: p.hair_color.clone(),
        body_type: p.body_type.clone(),
        hourly_rate: p.hourly_rate,
        services: p.services.clone(),
        is_vip: p.is_vip,
        is_verified_by_admin: p.is_verified,
        is_active: p.is_active,
        available_today: p.available_today,
        incall: p.incall,
        outcall: p.outcall,
        ..Default::default()
    }
}

/// The fixture catalog (Berlin and Hamburg).
pub fn catalog() -> LocationCatalog {
    LocationCatalog::from_toml(LOCATIONS_TOML).expect("fixture catalog parses")
}

/// Settings with the result cache disabled so every request hits the store.
pub fn uncached() -> SearchSettings {
    SearchSettings {
        cache_ttl: Duration::ZERO,
        ..Default::default()
    }
}

/// Test application over a memory store.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new(providers: &[TestProvider]) -> Self {
        Self::with_settings(providers, &uncached())
    }

    pub fn with_settings(providers: &[TestProvider], settings: &SearchSettings) -> Self {
        let store = MemoryProviderStore::with_providers(providers.iter().map(new_provider))
            .expect("fixture ids are unique");
        let state = AppState::with_store(Arc::new(store), catalog(), settings);
        let router = routes::app(state.clone());
        Self { state, router }
    }

    /// Make a request to the app.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.request(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// Collect a response body as bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body is JSON")
}

/// Display names of a search page, in order.
pub fn names(page: &serde_json::Value) -> Vec<String> {
    page["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|p| p["displayName"].as_str().unwrap_or_default().to_string())
        .collect()
}
