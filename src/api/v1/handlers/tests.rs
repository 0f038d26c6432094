use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{AppEnv, Config, TokenAlgorithm};
use crate::repos::error::StoreError;
use crate::repos::user_store::{RoleRef, UserRecord, UserStore, UserUpdate};
use crate::services::auth::jwt::{AccessTokenClaims, TokenCodec};
use crate::services::auth::password;
use crate::services::auth::provider::ProviderClient;
use crate::services::auth::test_keys::{TEST_RSA_PEMS, rs256_key_material};
use crate::services::auth::token_issuer::TokenService;
use crate::state::AppState;

const ISSUER: &str = "https://auth.test";
const CLIENT_ID: &str = "67d3cc714ce136a7831483c7";
const CLIENT_SECRET: &str = "testPassword!";

static SECRET_HASH: LazyLock<String> =
    LazyLock::new(|| password::hash_password(CLIENT_SECRET).unwrap());

struct InMemoryUserStore {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        update: UserUpdate,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };

        if let Some(v) = update.username {
            user.username = v;
        }
        if let Some(v) = update.email {
            user.email = v;
        }
        if let Some(v) = update.locale {
            user.locale = Some(v);
        }
        if let Some(v) = update.phone {
            user.phone = Some(v);
        }
        if let Some(v) = update.timezone {
            user.timezone = Some(v);
        }
        if let Some(v) = update.auth_type {
            user.auth_type = Some(v);
        }
        if let Some(v) = update.verified_email {
            user.verified_email = v;
        }
        if let Some(v) = update.idp_metadata_url {
            user.idp_metadata_url = Some(v);
        }

        Ok(Some(user.clone()))
    }
}

fn test_config() -> Config {
    let (private_pem, public_pem) = &*TEST_RSA_PEMS;
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        database_url: "postgres://unused".to_string(),
        issuer: ISSUER.to_string(),
        audience: "api".to_string(),
        algorithm: TokenAlgorithm::Rs256,
        jwt_private_key_pem: private_pem.clone(),
        jwt_public_key_pem: Some(public_pem.clone()),
        token_ttl_seconds: 3600,
        request_timeout_seconds: 5,
        authorization_endpoint_path: "/authorize".to_string(),
        token_endpoint_path: "/token".to_string(),
        introspection_endpoint_path: "/introspect".to_string(),
        revocation_endpoint_path: "/revoke".to_string(),
        userinfo_endpoint_path: "/userinfo".to_string(),
        registration_endpoint_path: "/user".to_string(),
        service_documentation_endpoint_path: "/reference".to_string(),
    }
}

fn stored_user(id: &str, password: Option<String>) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        username: "testuser".to_string(),
        email: "test@example.com".to_string(),
        password,
        phone: None,
        locale: Some("en_gb".to_string()),
        timezone: None,
        verified_email: false,
        auth_type: None,
        idp_metadata_url: None,
        roles: vec![RoleRef {
            id: "507f1f77bcf86cd799439011".to_string(),
            name: "editor".to_string(),
        }],
    }
}

fn fixture(users: Vec<UserRecord>) -> (Router, AppState) {
    fixture_with(test_config(), users)
}

fn fixture_with(config: Config, users: Vec<UserRecord>) -> (Router, AppState) {
    let config = Arc::new(config);
    let keys = rs256_key_material();
    let codec = TokenCodec::new(keys.clone(), config.issuer.clone(), config.audience.clone());
    let tokens = Arc::new(TokenService::new(codec, config.token_ttl_seconds));
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new(users));

    let state = AppState::new(
        config.clone(),
        keys,
        tokens,
        ProviderClient::allowing_http(),
        users,
    );
    let router = crate::app::build_router(state.clone(), config.as_ref());
    (router, state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

fn sso_request(metadata_url: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/sso/authorize")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer.to_string());
    }
    builder
        .body(Body::from(
            json!({ "metadataUrl": metadata_url }).to_string(),
        ))
        .unwrap()
}

mod token_endpoint {
    use super::*;

    #[tokio::test]
    async fn rejects_unsupported_grant_type() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(
            &router,
            form_request("/token", "grant_type=password&client_id=a&client_secret=b"),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unsupported_grant_type");
        assert_eq!(body["statusCode"], 401);
    }

    #[tokio::test]
    async fn issues_token_for_form_credentials() {
        let (router, state) =
            fixture(vec![stored_user(CLIENT_ID, Some(SECRET_HASH.clone()))]);

        let body = format!(
            "grant_type=client_credentials&client_id={CLIENT_ID}&client_secret={}",
            "testPassword%21"
        );
        let (status, body) = send(&router, form_request("/token", &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);

        let claims = state
            .tokens
            .codec()
            .verify(body["access_token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, CLIENT_ID);
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.roles.unwrap()[0].name, "editor");
    }

    #[tokio::test]
    async fn issues_token_for_basic_auth() {
        let (router, _) = fixture(vec![stored_user(CLIENT_ID, Some(SECRET_HASH.clone()))]);

        let basic = BASE64_STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"));
        let request = Request::builder()
            .method("POST")
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::AUTHORIZATION, format!("Basic {basic}"))
            .body(Body::from("grant_type=client_credentials"))
            .unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
    }

    #[tokio::test]
    async fn basic_header_takes_precedence_over_form() {
        let (router, _) = fixture(vec![stored_user(CLIENT_ID, Some(SECRET_HASH.clone()))]);

        let basic = BASE64_STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"));
        let request = Request::builder()
            .method("POST")
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::AUTHORIZATION, format!("Basic {basic}"))
            .body(Body::from(
                "grant_type=client_credentials&client_id=nobody&client_secret=wrong",
            ))
            .unwrap();
        let (status, _) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_wrong_secret() {
        let (router, _) = fixture(vec![stored_user(CLIENT_ID, Some(SECRET_HASH.clone()))]);

        let body = format!(
            "grant_type=client_credentials&client_id={CLIENT_ID}&client_secret=wrong"
        );
        let (status, body) = send(&router, form_request("/token", &body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_client");
        assert_eq!(body["message"], "Credentials are not valid.");
    }

    #[tokio::test]
    async fn rejects_unknown_client() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(
            &router,
            form_request(
                "/token",
                "grant_type=client_credentials&client_id=nobody&client_secret=x",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_client");
    }

    // Federated principals have no stored secret; the lookup alone
    // authenticates them.
    #[tokio::test]
    async fn skips_password_check_without_stored_hash() {
        let (router, _) = fixture(vec![stored_user(CLIENT_ID, None)]);

        let body = format!(
            "grant_type=client_credentials&client_id={CLIENT_ID}&client_secret=anything"
        );
        let (status, _) = send(&router, form_request("/token", &body)).await;

        assert_eq!(status, StatusCode::OK);
    }
}

mod authorize_endpoint {
    use super::*;

    #[tokio::test]
    async fn missing_header_and_missing_token_are_distinct() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(&router, get_request("/authorize", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authorization header is missing.");

        let (status, body) = send(&router, get_request("/authorize", Some("Bearer"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Bearer token is missing.");
    }

    #[tokio::test]
    async fn introspects_a_valid_token() {
        let (router, state) = fixture(vec![stored_user(CLIENT_ID, None)]);
        let token = issue(&state).await;

        let (status, body) = send(
            &router,
            get_request("/authorize", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], true);
        assert_eq!(body["sub"], CLIENT_ID);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["username"], "testuser");
        assert_eq!(body["iss"], ISSUER);
    }

    #[tokio::test]
    async fn emits_a_bearer_challenge_on_401() {
        let (router, _) = fixture(vec![]);

        let response = router
            .clone()
            .oneshot(get_request("/authorize", Some("Bearer garbage")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(
            challenge,
            format!("Bearer realm=\"{ISSUER}\", error=\"invalid_request\"")
        );
    }

    // A tampered token and an expired token must be indistinguishable from
    // the outside.
    #[tokio::test]
    async fn verification_failures_are_opaque() {
        let (router, state) = fixture(vec![stored_user(CLIENT_ID, None)]);

        let token = issue(&state).await;
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let flipped = if parts[1].starts_with('A') { "B" } else { "A" };
        parts[1].replace_range(0..1, flipped);
        let tampered = parts.join(".");

        let now = Utc::now().timestamp();
        let expired_claims = AccessTokenClaims {
            sub: CLIENT_ID.to_string(),
            email: "test@example.com".to_string(),
            aud: "api".to_string(),
            exp: now - 1,
            iat: now - 3600,
            iss: ISSUER.to_string(),
            nbf: now - 3600,
            username: "testuser".to_string(),
            roles: None,
            locale: None,
            timezone: None,
        };
        let expired = state.tokens.codec().create(&expired_claims).unwrap();

        let (tampered_status, tampered_body) = send(
            &router,
            get_request("/authorize", Some(&format!("Bearer {tampered}"))),
        )
        .await;
        let (expired_status, expired_body) = send(
            &router,
            get_request("/authorize", Some(&format!("Bearer {expired}"))),
        )
        .await;

        assert_eq!(tampered_status, StatusCode::UNAUTHORIZED);
        assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
        assert_eq!(tampered_body, expired_body);
        assert_eq!(tampered_body["error"], "invalid_request");
    }
}

mod introspect_and_revoke {
    use super::*;

    #[tokio::test]
    async fn introspect_requires_token_field() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(&router, form_request("/introspect", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn introspect_projects_claims() {
        let (router, state) = fixture(vec![stored_user(CLIENT_ID, None)]);
        let token = issue(&state).await;

        let (status, body) =
            send(&router, form_request("/introspect", &format!("token={token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], true);
        assert_eq!(body["sub"], CLIENT_ID);
    }

    #[tokio::test]
    async fn introspect_rejects_invalid_token_opaquely() {
        let (router, _) = fixture(vec![]);

        let (status, body) =
            send(&router, form_request("/introspect", "token=not-a-jwt")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn revoke_requires_token_field() {
        let (router, _) = fixture(vec![]);

        let (status, _) = send(&router, form_request("/revoke", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // There is no token store: revocation is acknowledged but the token
    // stays valid until it expires. Pinned so a future denylist is a
    // deliberate change.
    #[tokio::test]
    async fn revoked_token_remains_valid_until_expiry() {
        let (router, state) = fixture(vec![stored_user(CLIENT_ID, None)]);
        let token = issue(&state).await;

        let (status, _) =
            send(&router, form_request("/revoke", &format!("token={token}"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &router,
            get_request("/authorize", Some(&format!("Bearer {token}"))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], true);
    }
}

mod discovery_endpoints {
    use super::*;

    #[tokio::test]
    async fn jwks_publishes_the_rsa_key() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(&router, get_request("/.well-known/jwks.json", None)).await;

        assert_eq!(status, StatusCode::OK);
        let key = &body["keys"][0];
        assert_eq!(key["kty"], "RSA");
        assert_eq!(key["alg"], "RS256");
        assert_eq!(key["kid"], "sst");
        assert_eq!(key["e"], "AQAB");
        assert!(!key["n"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_reflects_configured_paths() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(
            &router,
            get_request("/.well-known/oauth-authorization-server", None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["issuer"], ISSUER);
        assert_eq!(body["token_endpoint"], format!("{ISSUER}/token"));
        assert_eq!(body["jwks_uri"], format!("{ISSUER}/.well-known/jwks.json"));
        assert_eq!(body["introspection_endpoint"], format!("{ISSUER}/introspect"));
        assert_eq!(body["revocation_endpoint"], format!("{ISSUER}/revoke"));
        assert_eq!(body["userinfo_endpoint"], format!("{ISSUER}/userinfo"));
        assert_eq!(body["grant_types_supported"], json!(["client_credentials"]));
    }
}

mod userinfo_endpoint {
    use super::*;

    #[tokio::test]
    async fn requires_a_verified_bearer() {
        let (router, _) = fixture(vec![stored_user(CLIENT_ID, None)]);

        let (status, _) = send(&router, get_request("/userinfo", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            send(&router, get_request("/userinfo", Some("Bearer garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn returns_profile_without_password() {
        let (router, state) =
            fixture(vec![stored_user(CLIENT_ID, Some(SECRET_HASH.clone()))]);
        let token = issue(&state).await;

        let (status, body) = send(
            &router,
            get_request("/userinfo", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "testuser");
        assert_eq!(body["email"], "test@example.com");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn answers_404_for_a_vanished_subject() {
        let (router, state) = fixture(vec![stored_user(CLIENT_ID, None)]);
        let token = issue(&state).await;

        // Token is valid, but the record is gone.
        drop(router);
        let (router_empty, _) = fixture(vec![]);

        let (status, body) = send(
            &router_empty,
            get_request("/userinfo", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not Found");
        assert_eq!(body["statusCode"], 404);
    }
}

mod sso_endpoint {
    use super::*;

    const WELL_KNOWN: &str = "/.well-known/openid-configuration";

    async fn provider_with_metadata(userinfo: Value) -> MockServer {
        let server = MockServer::start().await;
        let userinfo_endpoint = format!("{}/userinfo", server.uri());

        Mock::given(method("GET"))
            .and(path(WELL_KNOWN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authorization_endpoint": format!("{}/auth", server.uri()),
                "token_endpoint": format!("{}/token", server.uri()),
                "userinfo_endpoint": userinfo_endpoint,
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(userinfo))
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn requires_bearer_presence() {
        let (router, _) = fixture(vec![]);

        let (status, body) = send(&router, sso_request("https://x", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authorization header is missing.");

        let (status, body) = send(&router, sso_request("https://x", Some("Bearer"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Bearer token is missing.");
    }

    #[tokio::test]
    async fn rejects_metadata_without_userinfo_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authorization_endpoint": "https://example.com/auth",
            })))
            .mount(&server)
            .await;

        let (router, _) = fixture(vec![stored_user("provider-sub", None)]);
        let (status, body) = send(
            &router,
            sso_request(
                &format!("{}{WELL_KNOWN}", server.uri()),
                Some("Bearer provider-token"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["statusCode"], 500);
    }

    #[tokio::test]
    async fn rejects_provider_401_generically() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "userinfo_endpoint": format!("{}/userinfo", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (router, _) = fixture(vec![]);
        let (status, _) = send(
            &router,
            sso_request(
                &format!("{}{WELL_KNOWN}", server.uri()),
                Some("Bearer provider-token"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn exchanges_provider_identity_for_a_local_token() {
        let server = provider_with_metadata(json!({
            "sub": "provider-sub",
            "email": "federated@example.com",
            "locale": "fr_fr",
        }))
        .await;

        let (router, state) = fixture(vec![stored_user("provider-sub", None)]);
        let metadata_url = format!("{}{WELL_KNOWN}", server.uri());
        let (status, body) = send(
            &router,
            sso_request(&metadata_url, Some("Bearer provider-token")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");

        let claims = state
            .tokens
            .codec()
            .verify(body["access_token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, "provider-sub");
        assert_eq!(claims.email, "federated@example.com");

        // Only present provider fields were merged; the federated markers
        // are always written.
        let user = state.users.find_by_id("provider-sub").await.unwrap().unwrap();
        assert_eq!(user.email, "federated@example.com");
        assert_eq!(user.locale.as_deref(), Some("fr_fr"));
        assert_eq!(user.username, "testuser");
        assert_eq!(user.auth_type.as_deref(), Some("oidc"));
        assert!(user.verified_email);
        assert_eq!(user.idp_metadata_url.as_deref(), Some(metadata_url.as_str()));
    }

    // The overall request deadline aborts a hanging provider fetch and
    // surfaces as 504, not 500.
    #[tokio::test]
    async fn slow_provider_fetch_times_out_as_504() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "userinfo_endpoint": "https://example.com/userinfo",
                    }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut config = test_config();
        config.request_timeout_seconds = 1;
        let (router, _) = fixture_with(config, vec![]);

        let (status, body) = send(
            &router,
            sso_request(
                &format!("{}{WELL_KNOWN}", server.uri()),
                Some("Bearer provider-token"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["statusCode"], 504);
        assert_eq!(body["message"], "The request timed out.");
    }

    // First-time federated login: no pre-provisioned record, no
    // auto-provisioning, the exchange fails.
    #[tokio::test]
    async fn fails_for_an_unknown_subject() {
        let server = provider_with_metadata(json!({ "sub": "stranger" })).await;

        let (router, _) = fixture(vec![]);
        let (status, body) = send(
            &router,
            sso_request(
                &format!("{}{WELL_KNOWN}", server.uri()),
                Some("Bearer provider-token"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["statusCode"], 500);
    }
}

async fn issue(state: &AppState) -> String {
    let user = state.users.find_by_id(CLIENT_ID).await.unwrap().unwrap();
    state.tokens.issue_for(&user).unwrap().access_token
}
