#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use freemarket_backend::{
    AppState,
    config::CorsPolicy,
    database::memory::InMemoryStore,
    infrastructure::{TextGenerator, TokenService, UpstreamError},
    router::create_router,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
/// Lowest cost bcrypt accepts; keeps signups fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Records prompts and answers with a fixed text.
#[derive(Default)]
pub struct FakeGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        self.prompts.lock().push(prompt.to_string());
        Ok("A well kept item, ready for its next owner.".to_string())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub tokens: TokenService,
    pub generator: Arc<FakeGenerator>,
}

pub fn spawn_app() -> TestApp {
    let store = InMemoryStore::new();
    let tokens = TokenService::new(SECRET, "freemarket-backend", Duration::from_secs(24 * 3600));
    let generator = Arc::new(FakeGenerator::default());

    let state = AppState {
        tokens: tokens.clone(),
        bcrypt_cost: TEST_BCRYPT_COST,
        users: Arc::new(store.clone()),
        products: Arc::new(store.clone()),
        likes: Arc::new(store.clone()),
        messages: Arc::new(store.clone()),
        text_generator: generator.clone(),
    };

    TestApp {
        router: create_router(state, CorsPolicy::default()),
        store,
        tokens,
        generator,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(self.router.clone(), method, uri, token, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn signup(&self, user_id: &str, password: &str, display_name: &str) {
        let (status, _) = self
            .post(
                "/signup",
                None,
                json!({ "userId": user_id, "password": password, "displayName": display_name, "mbti": "INFP" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup of {user_id} failed");
    }

    /// Signs up and logs in, returning the bearer token.
    pub async fn register(&self, user_id: &str, display_name: &str) -> String {
        self.signup(user_id, "password", display_name).await;
        let (status, body) = self
            .post("/login", None, json!({ "userId": user_id, "password": "password" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_product(&self, seller_id: &str, price: i64) -> String {
        let (status, body) = self
            .post(
                "/products",
                None,
                json!({ "title": "Bicycle", "price": price, "description": "City bike", "sellerId": seller_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}
