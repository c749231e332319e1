//! End-to-end router tests with mock collaborators
//!
//! The router is exercised through `tower::ServiceExt::oneshot` with a
//! recording config store and a fixture DNS resolver injected through
//! `AppState::with_collaborators`.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;
use trust_dns_resolver::error::ResolveError;

use custom_domain_api::auth::Claims;
use custom_domain_api::consul::{ConsulError, KvStore};
use custom_domain_api::dns::{DnsValidationVerdict, DomainIpResolver};
use custom_domain_api::routes::create_router;
use custom_domain_api::{AppState, Config};

const JWT_SECRET: &str = "test-jwt-secret-must-be-at-least-32-characters-long";
const OUR_IP: &str = "184.106.28.222";
const HTTPS_BASE: &str = "/v1/kv/traefik/http/routers/https_news.example.com";
const HTTP_BASE: &str = "/v1/kv/traefik/http/routers/http_news.example.com";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Put(String, String),
    DeleteRecursive(String),
}

#[derive(Default)]
struct RecordingStore {
    ops: Mutex<Vec<Op>>,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self { ops: Mutex::new(Vec::new()), fail: true }
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl KvStore for RecordingStore {
    async fn put_string(&self, path: &str, value: &str) -> Result<(), ConsulError> {
        if self.fail {
            return Err(ConsulError::UnexpectedStatus {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        self.ops.lock().unwrap().push(Op::Put(path.to_string(), value.to_string()));
        Ok(())
    }

    async fn delete_recursive(&self, path: &str) -> Result<(), ConsulError> {
        if self.fail {
            return Err(ConsulError::UnexpectedStatus {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        self.ops.lock().unwrap().push(Op::DeleteRecursive(path.to_string()));
        Ok(())
    }
}

struct FixtureResolver {
    ips: Vec<IpAddr>,
}

impl FixtureResolver {
    fn pointing_to_us() -> Self {
        Self { ips: vec![OUR_IP.parse().unwrap()] }
    }

    fn pointing_elsewhere() -> Self {
        Self { ips: vec!["203.0.113.9".parse().unwrap()] }
    }
}

#[async_trait]
impl DomainIpResolver for FixtureResolver {
    async fn lookup_ips(&self, _domain_name: &str) -> Result<Vec<IpAddr>, ResolveError> {
        Ok(self.ips.clone())
    }
}

fn test_config(verdict: DnsValidationVerdict) -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        consul_base_address: "http://consul:8500".to_string(),
        our_service_ips: vec![OUR_IP.parse().unwrap()],
        not_resolving_verdict: verdict,
        service_mapping: HashMap::from([(
            "relay-tracking".to_string(),
            "relay-actions-api_service_prod@docker".to_string(),
        )]),
        jwt_secret: JWT_SECRET.to_string(),
        taxinfo_use_dummy_data: true,
        taxinfo_base_url: String::new(),
        taxinfo_username: String::new(),
        taxinfo_password: String::new(),
    }
}

struct TestApp {
    router: Router,
    store: Arc<RecordingStore>,
}

fn app(verdict: DnsValidationVerdict, resolver: FixtureResolver, store: RecordingStore) -> TestApp {
    let store = Arc::new(store);
    let state = AppState::with_collaborators(test_config(verdict), store.clone(), Arc::new(resolver));
    TestApp { router: create_router(state), store }
}

fn default_app() -> TestApp {
    app(
        DnsValidationVerdict::Allow,
        FixtureResolver::pointing_to_us(),
        RecordingStore::default(),
    )
}

fn token(is_su: bool) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
    let claims = Claims {
        sub: "account-123".to_string(),
        iat: now,
        exp: now + 3600,
        is_su,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn put_domain_request(body: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri("/news.example.com")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const HTTPS_ONLY_BODY: &str = r#"{"service":"relay-tracking","ruleType":"HttpsOnly"}"#;

fn put(path: &str, value: &str) -> Op {
    Op::Put(path.to_string(), value.to_string())
}

fn del(path: &str) -> Op {
    Op::DeleteRecursive(path.to_string())
}

fn expected_https_only_ops() -> Vec<Op> {
    vec![
        put(&format!("{HTTPS_BASE}/entrypoints"), "websecure_entry_point"),
        put(&format!("{HTTPS_BASE}/tls/certresolver"), "letsencryptresolver"),
        put(&format!("{HTTPS_BASE}/rule"), "Host(`news.example.com`)"),
        put(
            &format!("{HTTPS_BASE}/service"),
            "relay-actions-api_service_prod@docker",
        ),
        put(&format!("{HTTP_BASE}/entrypoints"), "web_entry_point"),
        put(
            &format!("{HTTP_BASE}/service"),
            "relay-actions-api_service_prod@docker",
        ),
        put(&format!("{HTTP_BASE}/rule"), "Host(`news.example.com`)"),
        put(&format!("{HTTP_BASE}/middlewares"), "http_to_https@file"),
    ]
}

#[tokio::test]
async fn home_is_public() {
    let app = default_app();
    let response = app.router.oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Custom Domain Service");
}

#[tokio::test]
async fn health_is_public() {
    let app = default_app();
    let response = app.router.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_domain_requires_a_token() {
    let app = default_app();
    let response = app
        .router
        .oneshot(put_domain_request(HTTPS_ONLY_BODY, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.store.ops().is_empty());
}

#[tokio::test]
async fn create_domain_requires_superuser_privilege() {
    let app = default_app();
    let response = app
        .router
        .oneshot(put_domain_request(HTTPS_ONLY_BODY, Some(&token(false))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.store.ops().is_empty());
}

#[tokio::test]
async fn create_domain_with_unknown_service_is_not_found_before_any_store_call() {
    let app = default_app();
    let body = r#"{"service":"unknown-service","ruleType":"HttpsOnly"}"#;
    let response = app
        .router
        .oneshot(put_domain_request(body, Some(&token(true))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_string(response).await;
    assert!(body.contains("Cannot find the service called: unknown-service"));
    assert!(app.store.ops().is_empty());
}

#[tokio::test]
async fn create_domain_writes_the_full_https_only_sequence() {
    let app = default_app();
    let response = app
        .router
        .oneshot(put_domain_request(HTTPS_ONLY_BODY, Some(&token(true))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Custom Domain Created");
    assert_eq!(app.store.ops(), expected_https_only_ops());
}

#[tokio::test]
async fn create_domain_with_https_and_http_deletes_the_redirect() {
    let app = default_app();
    let body = r#"{"service":"relay-tracking","ruleType":"HttpsAndHttp"}"#;
    let response = app
        .router
        .oneshot(put_domain_request(body, Some(&token(true))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let mut expected = expected_https_only_ops();
    expected.pop();
    expected.push(del(&format!("{HTTP_BASE}/middlewares")));
    assert_eq!(app.store.ops(), expected);
}

#[tokio::test]
async fn non_pointing_domain_is_still_registered_under_allow_verdict() {
    let app = app(
        DnsValidationVerdict::Allow,
        FixtureResolver::pointing_elsewhere(),
        RecordingStore::default(),
    );
    let response = app
        .router
        .oneshot(put_domain_request(HTTPS_ONLY_BODY, Some(&token(true))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.ops(), expected_https_only_ops());
}

#[tokio::test]
async fn non_pointing_domain_is_skipped_under_ignore_verdict() {
    let app = app(
        DnsValidationVerdict::Ignore,
        FixtureResolver::pointing_elsewhere(),
        RecordingStore::default(),
    );
    let response = app
        .router
        .oneshot(put_domain_request(HTTPS_ONLY_BODY, Some(&token(true))))
        .await
        .unwrap();

    // Success-shaped response, but nothing reached the store.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Custom Domain Created");
    assert!(app.store.ops().is_empty());
}

#[tokio::test]
async fn store_failure_surfaces_as_internal_server_error() {
    let app = app(
        DnsValidationVerdict::Allow,
        FixtureResolver::pointing_to_us(),
        RecordingStore::failing(),
    );
    let response = app
        .router
        .oneshot(put_domain_request(HTTPS_ONLY_BODY, Some(&token(true))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn delete_domain_removes_both_key_groups_and_the_redirect() {
    let app = default_app();
    let request = Request::builder()
        .method("DELETE")
        .uri("/news.example.com")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(true)))
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Custom Domain Deleted");
    assert_eq!(
        app.store.ops(),
        vec![
            del(HTTPS_BASE),
            del(HTTP_BASE),
            del(&format!("{HTTP_BASE}/middlewares")),
        ]
    );
}

#[tokio::test]
async fn ip_resolution_reports_pointing_domains() {
    let app = default_app();
    let response = app
        .router
        .oneshot(get_request(
            "/news.example.com/_ip-resolution",
            Some(&token(false)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "news.example.com resolves to our service IP address"
    );
}

#[tokio::test]
async fn ip_resolution_rejects_non_pointing_domains() {
    let app = app(
        DnsValidationVerdict::Allow,
        FixtureResolver::pointing_elsewhere(),
        RecordingStore::default(),
    );
    let response = app
        .router
        .oneshot(get_request(
            "/news.example.com/_ip-resolution",
            Some(&token(false)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("news.example.com does not resolve to our service IP address"));
}

#[tokio::test]
async fn tax_info_lookup_returns_the_record_for_a_valid_cuit() {
    let app = default_app();
    let response = app
        .router
        .oneshot(get_request(
            "/taxinfo/by-cuit/20-31111111-7",
            Some(&token(false)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["CUIT"], "20-31111111-7");
    assert_eq!(body["EstadoCUIT"], "ACTIVO");
}

#[tokio::test]
async fn tax_info_lookup_rejects_a_wrong_verification_digit() {
    let app = default_app();
    let response = app
        .router
        .oneshot(get_request(
            "/taxinfo/by-cuit/20-31111111-8",
            Some(&token(false)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("The CUIT's verification digit is wrong."));
}

#[tokio::test]
async fn tax_info_lookup_rejects_invalid_characters() {
    let app = default_app();
    let response = app
        .router
        .oneshot(get_request(
            "/taxinfo/by-cuit/20-3111111a-8",
            Some(&token(false)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("cannot have other characters than numbers and dashes"));
}

#[tokio::test]
async fn tax_info_lookup_without_a_cuit_segment_is_not_found() {
    let app = default_app();
    let response = app
        .router
        .oneshot(get_request("/taxinfo/by-cuit/", Some(&token(false))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
