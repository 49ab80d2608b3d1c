//! Test doubles for the external providers and an in-process app driver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::billing::{BillingError, BillingProvider};
use crate::config::Config;
use crate::generation::gateway::{PaletteGateway, DEFAULT_MODELS};
use crate::identity::{IdentityError, IdentityProvider, IdentityUser};
use crate::llm_client::{InlineImage, LlmError, PaletteModel};
use crate::models::user::PlanTier;
use crate::rewards::SIGNUP_POINTS;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        supabase_url: "https://auth.test".to_string(),
        supabase_anon_key: "anon".to_string(),
        stripe_secret_key: "sk_test".to_string(),
        stripe_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        stripe_price_plus: "price_plus".to_string(),
        stripe_price_pro: "price_pro".to_string(),
        frontend_url: "https://app.test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub instruction: String,
    pub image: Option<InlineImage>,
}

enum Script {
    Reply(String),
    Fail { status: u16, message: String },
}

/// Replies per model name. Models without a script fail with a 404.
#[derive(Default)]
pub struct ScriptedModel {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model: &str, text: &str) -> Self {
        self.scripts
            .insert(model.to_string(), Script::Reply(text.to_string()));
        self
    }

    pub fn fail(mut self, model: &str, status: u16, message: &str) -> Self {
        self.scripts.insert(
            model.to_string(),
            Script::Fail {
                status,
                message: message.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }
}

#[async_trait]
impl PaletteModel for ScriptedModel {
    async fn generate(
        &self,
        model: &str,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            instruction: instruction.to_string(),
            image: image.cloned(),
        });
        match self.scripts.get(model) {
            Some(Script::Reply(text)) => Ok(text.clone()),
            Some(Script::Fail { status, message }) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Err(LlmError::Api {
                status: 404,
                message: format!("models/{model} is not found"),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Identity provider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<HashMap<String, IdentityUser>>,
}

impl FakeIdentity {
    pub fn register(&self, id: &str, email: &str) -> String {
        let token = format!("token-{id}");
        self.users.lock().unwrap().insert(
            token.clone(),
            IdentityUser {
                id: id.to_string(),
                email: Some(email.to_string()),
                user_metadata: Default::default(),
            },
        );
        token
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn resolve(&self, token: &str) -> Result<IdentityUser, IdentityError> {
        self.users
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                status: 401,
                message: "invalid JWT".to_string(),
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Billing provider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct BillingLedger {
    subscriptions: HashMap<String, String>,
    checkouts: Vec<(Option<String>, String)>,
}

/// Clones share one ledger, so a test can keep a handle after handing one to the app.
#[derive(Clone, Default)]
pub struct FakeBilling {
    ledger: Arc<Mutex<BillingLedger>>,
}

impl FakeBilling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscription(self, subscription_id: &str, price_id: &str) -> Self {
        self.ledger
            .lock()
            .unwrap()
            .subscriptions
            .insert(subscription_id.to_string(), price_id.to_string());
        self
    }

    pub fn checkouts(&self) -> Vec<(Option<String>, String)> {
        self.ledger.lock().unwrap().checkouts.clone()
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn create_checkout_session(
        &self,
        customer_email: Option<&str>,
        price_id: &str,
    ) -> Result<String, BillingError> {
        self.ledger
            .lock()
            .unwrap()
            .checkouts
            .push((customer_email.map(String::from), price_id.to_string()));
        Ok(format!("https://checkout.test/pay/{price_id}"))
    }

    async fn subscription_price(&self, subscription_id: &str) -> Result<String, BillingError> {
        self.ledger
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| BillingError::Api {
                status: 404,
                message: format!("No such subscription: '{subscription_id}'"),
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// App driver
// ────────────────────────────────────────────────────────────────────────────

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    identity: Arc<FakeIdentity>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(ScriptedModel::new(), FakeBilling::new())
    }

    pub fn with_model(model: ScriptedModel) -> Self {
        Self::build(model, FakeBilling::new())
    }

    pub fn with_billing(billing: FakeBilling) -> Self {
        Self::build(ScriptedModel::new(), billing)
    }

    fn build(model: ScriptedModel, billing: FakeBilling) -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(FakeIdentity::default());
        let state = AppState {
            store: store.clone(),
            gateway: PaletteGateway::new(config.gemini_models.clone(), Arc::new(model)),
            identity: identity.clone(),
            billing: Arc::new(billing),
            config,
        };
        TestApp {
            store,
            identity,
            router: build_router(state),
        }
    }

    /// Makes `email` known to the identity provider only. The local row is
    /// created by the first authenticated request.
    pub fn register_identity(&self, id: &str, email: &str) -> String {
        self.identity.register(id, email)
    }

    /// An already-registered user on `plan` holding the signup points.
    pub fn sign_in(&self, id: &str, email: &str, plan: PlanTier) -> String {
        self.store
            .seed_user_with_points(id, email, plan, SIGNUP_POINTS);
        self.identity.register(id, email)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    fn request(method: Method, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    fn json_body(bytes: &Bytes) -> Value {
        if bytes.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }

    pub async fn get_raw(&self, path: &str, token: Option<&str>) -> (StatusCode, HeaderMap, Bytes) {
        let request = Self::request(Method::GET, path, token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let (status, _, body) = self.get_raw(path, token).await;
        (status, Self::json_body(&body))
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = Self::request(Method::DELETE, path, token)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, Self::json_body(&body))
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        json: Value,
    ) -> (StatusCode, Value) {
        let request = Self::request(Method::POST, path, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, Self::json_body(&body))
    }

    /// Posts a single-file multipart form.
    pub async fn post_file(
        &self,
        path: &str,
        token: Option<&str>,
        field: &str,
        file_name: &str,
        contents: &[u8],
    ) -> (StatusCode, Value) {
        const BOUNDARY: &str = "aura-test-boundary";
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Self::request(Method::POST, path, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, Self::json_body(&body))
    }

    /// Posts a raw webhook body, optionally with a `Stripe-Signature` header.
    pub async fn post_webhook(&self, body: &str, signature: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/stripe-webhook")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header("stripe-signature", signature);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }
}
