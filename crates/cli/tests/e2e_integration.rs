//! End-to-end tests for the ragguard gateway.
//!
//! These drive the real router, auth gate and pipeline over HTTP requests,
//! with an in-memory index and a recording provider standing in for the
//! embedding and completion endpoints.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeDelta, Utc};
use http_body_util::BodyExt;
use ragguard_config::GatewayConfig;
use ragguard_core::error::ProviderError;
use ragguard_core::message::{Message, MessageRole};
use ragguard_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
};
use ragguard_core::{Document, Role, User};
use ragguard_gateway::{AppState, SharedState, build_router};
use ragguard_index::InMemoryIndex;
use ragguard_pipeline::{DEGRADED_ANSWER, NO_ACCESSIBLE_ANSWER, Pipeline, PipelineSettings, Services};
use ragguard_security::{AuditLogger, AuthGate, InMemoryCredentialStore, PasswordHasher, TokenSigner};
use serde_json::Value;
use tower::ServiceExt;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Embeds every input to the same vector and records each completion prompt.
struct RecordingProvider {
    reachable: bool,
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    fn new(reachable: bool) -> Self {
        Self {
            reachable,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        if !self.reachable {
            return Err(ProviderError::Network("connection refused".into()));
        }
        Ok(ProviderResponse {
            message: Message::assistant("Q1 revenue was $10M according to the report."),
            usage: None,
            model: request.model,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|_| vec![1.0, 0.0]).collect(),
            model: request.model,
        })
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

const SECRET: &str = "e2e-secret";

struct Harness {
    app: Router,
    state: SharedState,
    provider: Arc<RecordingProvider>,
}

fn tagged(id: &str, text: &str, department: &str, source: &str) -> Document {
    Document::new(id, text)
        .with_metadata("department", department)
        .with_metadata("source", source)
}

async fn company_index() -> InMemoryIndex {
    let index = InMemoryIndex::new();
    let docs = [
        (tagged("fin-1", "Q1 revenue was $10M.", "finance", "q1_report.md"), vec![1.0, 0.0]),
        (tagged("fin-2", "Q2 is forecast at $12M.", "finance", "q2_forecast.md"), vec![0.9, 0.1]),
        (tagged("hr-1", "Salary bands were revised in March.", "hr", "salary_bands.md"), vec![0.95, 0.05]),
        (tagged("mkt-1", "The spring campaign reached 2M people.", "marketing", "campaign.md"), vec![0.8, 0.2]),
    ];
    for (doc, embedding) in docs {
        index.insert(doc, embedding).await;
    }
    index
}

async fn harness(completion_reachable: bool, index: InMemoryIndex) -> Harness {
    let hasher = PasswordHasher::with_params(8, 1, 1).unwrap();
    let store = InMemoryCredentialStore::demo(&hasher).unwrap();
    let auth = Arc::new(AuthGate::new(
        Arc::new(store),
        hasher,
        TokenSigner::new(SECRET).unwrap(),
    ));

    let provider = Arc::new(RecordingProvider::new(completion_reachable));
    let services = Services::new(
        provider.clone(),
        provider.clone(),
        Arc::new(index),
        PipelineSettings::default(),
    );

    let state = Arc::new(AppState::new(
        auth,
        Arc::new(Pipeline::new(services)),
        Arc::new(AuditLogger::new()),
        100,
    ));
    let app = build_router(state.clone(), &GatewayConfig::default());

    Harness {
        app,
        state,
        provider,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"username": username, "password": password}).to_string(),
        ))
        .unwrap();
    send(app, request).await
}

async fn token_for(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn query(app: &Router, token: &str, text: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::json!({"text": text}).to_string()))
        .unwrap();
    send(app, request).await
}

fn sources(body: &Value) -> Vec<String> {
    body["sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect()
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn finance_user_sees_only_finance_documents() {
    let h = harness(true, company_index().await).await;
    let token = token_for(&h.app, "finance_user", "finance_pass").await;

    let (status, body) = query(&h.app, &token, "What was Q1 revenue?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "finance");
    assert_eq!(body["answer"], "Q1 revenue was $10M according to the report.");
    assert_eq!(sources(&body), vec!["q1_report.md", "q2_forecast.md"]);

    let prompts = h.provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Q1 revenue was $10M."));
    assert!(!prompts[0].contains("Salary bands"));
    assert!(!prompts[0].contains("spring campaign"));
}

#[tokio::test]
async fn hr_user_never_receives_finance_content() {
    let h = harness(true, company_index().await).await;
    let token = token_for(&h.app, "hr_user", "hr_pass").await;

    let (status, body) = query(&h.app, &token, "What was Q1 revenue?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "hr");
    assert_eq!(sources(&body), vec!["salary_bands.md"]);

    for prompt in h.provider.prompts() {
        assert!(!prompt.contains("$10M."));
        assert!(!prompt.contains("$12M"));
    }
}

#[tokio::test]
async fn ceo_retrieves_across_departments() {
    let h = harness(true, company_index().await).await;
    let token = token_for(&h.app, "ceo_user", "ceo_pass").await;

    let (status, body) = query(&h.app, &token, "Summarise the company").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "ceo");
    // Default top_k is 3, ranked by similarity regardless of department.
    assert_eq!(
        sources(&body),
        vec!["q1_report.md", "salary_bands.md", "q2_forecast.md"]
    );
}

#[tokio::test]
async fn employee_with_no_general_documents_gets_fixed_answer() {
    let h = harness(true, company_index().await).await;
    let token = token_for(&h.app, "employee_user", "employee_pass").await;

    let (status, body) = query(&h.app, &token, "What is the holiday policy?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "answer": NO_ACCESSIBLE_ANSWER,
            "sources": [],
            "role": "employee"
        })
    );
    assert!(h.provider.prompts().is_empty(), "completion must not be called");
}

#[tokio::test]
async fn empty_index_gets_fixed_answer() {
    let h = harness(true, InMemoryIndex::new()).await;
    let token = token_for(&h.app, "marketing_user", "marketing_pass").await;

    let (_, body) = query(&h.app, &token, "Campaign reach?").await;
    assert_eq!(body["answer"], NO_ACCESSIBLE_ANSWER);
    assert!(sources(&body).is_empty());
    assert_eq!(body["role"], "marketing");
}

#[tokio::test]
async fn issued_token_round_trips_to_same_user() {
    let h = harness(true, company_index().await).await;
    let token = token_for(&h.app, "eng_user", "eng_pass").await;

    let user = h.state.auth.validate_token(&token).unwrap();
    assert_eq!(user, User::new("eng_user", Role::Engineering, Some("Engineering")));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let h = harness(true, company_index().await).await;
    let user = h.state.auth.authenticate("finance_user", "finance_pass").unwrap();
    let stale = h
        .state
        .auth
        .issue_token_at(&user, Utc::now() - TimeDelta::hours(3))
        .unwrap();

    let (status, body) = query(&h.app, &stale.token, "What was Q1 revenue?").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].as_str().unwrap().contains("expired"));
    assert!(h.provider.prompts().is_empty());
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let h = harness(true, company_index().await).await;
    let token = token_for(&h.app, "hr_user", "hr_pass").await;

    let mut tampered = token.into_bytes();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let (status, _) = query(&h.app, &tampered, "What was Q1 revenue?").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let h = harness(true, company_index().await).await;
    let other = AuthGate::new(
        Arc::new(InMemoryCredentialStore::demo(&PasswordHasher::with_params(8, 1, 1).unwrap()).unwrap()),
        PasswordHasher::with_params(8, 1, 1).unwrap(),
        TokenSigner::new("someone-elses-secret").unwrap(),
    );
    let user = other.authenticate("ceo_user", "ceo_pass").unwrap();
    let forged = other.issue_token(&user).unwrap();

    let (status, _) = query(&h.app, &forged.token, "Everything").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_gets_401_and_no_token() {
    let h = harness(true, company_index().await).await;

    let (status, body) = login(&h.app, "finance_user", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("access_token").is_none());
    assert_eq!(body["detail"], "Invalid username or password");
}

#[tokio::test]
async fn unreachable_completion_degrades_and_keeps_sources() {
    let h = harness(false, company_index().await).await;
    let token = token_for(&h.app, "finance_user", "finance_pass").await;

    let (status, body) = query(&h.app, &token, "What was Q1 revenue?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], DEGRADED_ANSWER);
    assert_eq!(sources(&body), vec!["q1_report.md", "q2_forecast.md"]);
    assert_eq!(body["role"], "finance");
    assert_eq!(h.provider.prompts().len(), 1);
}
