//! In-process stub of the storefront API.
//!
//! Binds to an ephemeral port and counts hits per endpoint so tests can
//! assert exactly how many requests a flow made.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use vitrine_client::{ApiClient, ClientConfig, Session, TokenStore, TokenStoreKind};

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "correct horse";
pub const REFRESH_TOKEN: &str = "refresh-1";

#[derive(Default)]
pub struct Hits {
    pub login: AtomicUsize,
    pub register: AtomicUsize,
    pub refresh: AtomicUsize,
    pub profile_get: AtomicUsize,
    pub profile_put: AtomicUsize,
    pub products: AtomicUsize,
    pub product: AtomicUsize,
}

impl Hits {
    pub fn total(&self) -> usize {
        [
            &self.login,
            &self.register,
            &self.refresh,
            &self.profile_get,
            &self.profile_put,
            &self.products,
            &self.product,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }
}

pub struct StubApi {
    pub hits: Hits,
    /// Access token the profile endpoint currently accepts.
    pub valid_access: Mutex<String>,
    /// Whether the refresh endpoint accepts `REFRESH_TOKEN`.
    pub refresh_works: AtomicBool,
    /// Whether login includes the user in its response.
    pub login_includes_user: AtomicBool,
    /// Whether the profile endpoint rejects every token.
    pub profile_always_unauthorized: AtomicBool,
    /// Product list requests that fail with 503 before one succeeds.
    pub product_failures: AtomicUsize,
    pub user: Mutex<Value>,
}

impl Default for StubApi {
    fn default() -> Self {
        StubApi {
            hits: Hits::default(),
            valid_access: Mutex::new("access-1".to_string()),
            refresh_works: AtomicBool::new(true),
            login_includes_user: AtomicBool::new(true),
            profile_always_unauthorized: AtomicBool::new(false),
            product_failures: AtomicUsize::new(0),
            user: Mutex::new(json!({
                "id": 7,
                "email": EMAIL,
                "first_name": "Ana",
                "last_name": "Lima"
            })),
        }
    }
}

type Stub = Arc<StubApi>;

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
        .into_response()
}

fn authorized(stub: &StubApi, headers: &HeaderMap) -> bool {
    if stub.profile_always_unauthorized.load(Ordering::SeqCst) {
        return false;
    }
    let expected = format!("Bearer {}", stub.valid_access.lock().unwrap());
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

async fn login(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.hits.login.fetch_add(1, Ordering::SeqCst);

    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "No active account found with the given credentials"})),
        )
            .into_response();
    }

    let access = stub.valid_access.lock().unwrap().clone();
    let mut response = json!({"access": access, "refresh": REFRESH_TOKEN});
    if stub.login_includes_user.load(Ordering::SeqCst) {
        response["user"] = stub.user.lock().unwrap().clone();
    }
    Json(response).into_response()
}

async fn register(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.hits.register.fetch_add(1, Ordering::SeqCst);

    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "email": ["user with this email already exists."],
                "password": ["This password is too common."]
            })),
        )
            .into_response();
    }

    {
        let mut user = stub.user.lock().unwrap();
        user["email"] = body["email"].clone();
        user["first_name"] = body["first_name"].clone();
        user["last_name"] = body["last_name"].clone();
    }

    let access = stub.valid_access.lock().unwrap().clone();
    (
        StatusCode::CREATED,
        Json(json!({"access": access, "refresh": REFRESH_TOKEN})),
    )
        .into_response()
}

async fn refresh(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.hits.refresh.fetch_add(1, Ordering::SeqCst);

    if !stub.refresh_works.load(Ordering::SeqCst) || body["refresh"] != REFRESH_TOKEN {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response();
    }

    let access = "access-2".to_string();
    *stub.valid_access.lock().unwrap() = access.clone();
    Json(json!({"access": access, "refresh": REFRESH_TOKEN})).into_response()
}

async fn get_profile(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.hits.profile_get.fetch_add(1, Ordering::SeqCst);

    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    Json(stub.user.lock().unwrap().clone()).into_response()
}

async fn put_profile(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.hits.profile_put.fetch_add(1, Ordering::SeqCst);

    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already in use"})),
        )
            .into_response();
    }

    let mut user = stub.user.lock().unwrap();
    if let (Some(user_fields), Some(update)) = (user.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            user_fields.insert(key.clone(), value.clone());
        }
    }
    Json(user.clone()).into_response()
}

pub fn products() -> Value {
    json!([
        {
            "id": 1,
            "name": "Field Watch",
            "price": "129.99",
            "image": "/media/field.jpg",
            "category": "watches",
            "sizePolicy": "single",
            "stockQuantity": 3,
            "images": [
                {"image_id": 11, "image_url": "/media/field-back.jpg", "is_primary": false, "display_order": 2},
                {"image_id": 10, "image_url": "/media/field.jpg", "is_primary": true, "display_order": 1}
            ]
        },
        {
            "id": 2,
            "name": "Leather Strap",
            "price": 40.0,
            "category": "straps",
            "size_policy": "multiple",
            "stock_quantity": 0,
            "variants": [
                {"variantId": 20, "size": {"id": 1, "name": "S"}, "priceAdjustment": 0, "stockQuantity": 0, "isActive": true},
                {"variantId": 21, "size": {"id": 2, "name": "M"}, "priceAdjustment": "2.50", "stockQuantity": 4, "isActive": true},
                {"variantId": 22, "size": {"id": 3, "name": "L"}, "priceAdjustment": 5, "stockQuantity": 9, "isActive": false}
            ]
        }
    ])
}

async fn list_products(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.products.fetch_add(1, Ordering::SeqCst);

    let pending = stub.product_failures.load(Ordering::SeqCst);
    if pending > 0 {
        stub.product_failures.store(pending - 1, Ordering::SeqCst);
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response();
    }

    let all = products();
    let filtered: Vec<Value> = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| match params.get("category") {
            Some(category) => p["category"]
                .as_str()
                .is_some_and(|c| c.eq_ignore_ascii_case(category)),
            None => true,
        })
        .cloned()
        .collect();
    Json(Value::Array(filtered)).into_response()
}

async fn product_detail(State(stub): State<Stub>, Path(id): Path<i64>) -> Response {
    stub.hits.product.fetch_add(1, Ordering::SeqCst);

    products()
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
        .cloned()
        .map(|p| Json(p).into_response())
        .unwrap_or_else(|| {
            (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
        })
}

/// Starts the stub and returns its API base URL.
pub async fn spawn_stub(stub: Stub) -> String {
    let app = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/token/refresh/", post(refresh))
        .route("/api/auth/profile/", get(get_profile).put(put_profile))
        .route("/api/products/", get(list_products))
        .route("/api/products/{id}/", get(product_detail))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

/// Client config for the stub: memory tokens, fast retries.
pub fn test_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::with_base_url(base_url);
    config.storage.backend = TokenStoreKind::Memory;
    config.retry.max_retries = 3;
    config.retry.initial_backoff_ms = 5;
    config.retry.max_backoff_secs = 1;
    config
}

pub fn session_with_store(base_url: &str, store: Arc<dyn TokenStore>) -> Session {
    let api = ApiClient::new(&test_config(base_url)).unwrap();
    Session::new(api, store)
}
