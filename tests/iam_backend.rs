// Integration tests for the IAM validation backend.
//
// These tests use wiremock to stand in for the IAM service and check the
// full fetch: client-credentials token, JWKS, revocation list.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chat_filter::auth::{AuthGate, IamValidationBackend, TokenValidator, ValidationBackend};
use chat_filter::error::AuthError;

const SECRET: &[u8] = b"iam-backend-test-secret-key";
const KID: &str = "iam-key-1";

fn token(sub: &str, iat: i64) -> String {
    let mut jwt_header = Header::new(Algorithm::HS256);
    jwt_header.kid = Some(KID.to_string());
    encode(
        &jwt_header,
        &json!({ "sub": sub, "iat": iat, "exp": Utc::now().timestamp() + 3600 }),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

async fn mount_iam(server: &MockServer, revoked_users: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/iam/v3/oauth/token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "service-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/iam/v3/oauth/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{ "kty": "oct", "kid": KID, "alg": "HS256", "k": URL_SAFE_NO_PAD.encode(SECRET) }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/iam/v3/oauth/revocationlist"))
        .and(header("authorization", "Bearer service-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "revoked_users": revoked_users })),
        )
        .mount(server)
        .await;
}

fn backend(server: &MockServer) -> IamValidationBackend {
    IamValidationBackend::new(
        &format!("{}/", server.uri()),
        "client-id".to_string(),
        "client-secret".to_string(),
    )
}

#[tokio::test]
async fn test_fetch_context_and_validate() {
    let server = MockServer::start().await;
    mount_iam(&server, json!([])).await;

    let context = backend(&server).fetch_context().await.unwrap();
    assert!(context.has_key(KID));

    let claims = context.validate(&token("user-1", Utc::now().timestamp())).unwrap();
    assert_eq!(claims.sub.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn test_revocation_list_applies() {
    let server = MockServer::start().await;
    let revoked_at = Utc::now() - chrono::Duration::minutes(5);
    mount_iam(
        &server,
        json!([{ "id": "user-2", "revoked_at": revoked_at.to_rfc3339() }]),
    )
    .await;

    let context = backend(&server).fetch_context().await.unwrap();
    let stale = token("user-2", revoked_at.timestamp() - 60);
    assert!(matches!(context.validate(&stale), Err(AuthError::Revoked)));
    assert!(context.validate(&token("user-3", revoked_at.timestamp() - 60)).is_ok());
}

#[tokio::test]
async fn test_token_endpoint_failure_is_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/iam/v3/oauth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = backend(&server).fetch_context().await.err().unwrap();
    assert!(matches!(err, AuthError::Backend(_)));
}

#[tokio::test]
async fn test_gate_initialization_fails_when_iam_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/iam/v3/oauth/jwks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = TokenValidator::initialize(Arc::new(backend(&server)), Duration::from_secs(600))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AuthError::Initialization(_)));
}

#[tokio::test]
async fn test_gate_end_to_end_with_iam() {
    let server = MockServer::start().await;
    mount_iam(&server, json!([])).await;

    let validator = TokenValidator::initialize(Arc::new(backend(&server)), Duration::from_secs(600))
        .await
        .unwrap();
    let gate = AuthGate::Enabled(Arc::new(validator));

    let authorization = format!("Bearer {}", token("user-1", Utc::now().timestamp()));
    assert!(gate.authorize(Some(&authorization)).unwrap().is_some());
    assert!(matches!(
        gate.authorize(None),
        Err(AuthError::MissingCredential)
    ));
}
