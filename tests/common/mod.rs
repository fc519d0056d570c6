//! Shared helpers for HTTP-level tests
//!
//! Tokens are RS256 JWTs signed with the fixture key whose public half is in
//! `fixtures/jwks.json` under kid `test-key-1`.

#![allow(dead_code)]

use axum_test::TestServer;
use casting::prelude::*;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use serde::Serialize;
use serde_json::Value;

pub const KID: &str = "test-key-1";
pub const ISSUER: &str = "https://casting.test/";
pub const AUDIENCE: &str = "casting";

const TEST_KEY: &str = include_str!("../fixtures/test_key.pem");
const OTHER_KEY: &str = include_str!("../fixtures/other_key.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

/// Every permission the API knows
pub const ALL_PERMISSIONS: &[&str] = &[
    "get:movies",
    "post:movies",
    "patch:movies",
    "delete:movies",
    "get:actors",
    "post:actors",
    "patch:actors",
    "delete:actors",
    "post:movies_actors",
    "delete:movies_actors",
    "post:actors_movies",
    "delete:actors_movies",
];

pub fn jwks_json() -> &'static str {
    JWKS
}

pub fn key_set() -> JwkSet {
    serde_json::from_str(JWKS).unwrap()
}

pub fn verifier() -> JwtVerifier {
    JwtVerifier::new(KeySource::local(key_set()), ISSUER, AUDIENCE)
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    iss: String,
    aud: String,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<Vec<String>>,
}

/// Builds signed test tokens
pub struct TokenBuilder {
    permissions: Option<Vec<String>>,
    issuer: String,
    audience: String,
    exp: u64,
    kid: Option<String>,
    pem: &'static str,
}

impl TokenBuilder {
    pub fn new() -> Self {
        Self {
            permissions: Some(Vec::new()),
            issuer: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
            exp: get_current_timestamp() + 3600,
            kid: Some(KID.to_string()),
            pem: TEST_KEY,
        }
    }

    pub fn permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = Some(permissions.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn without_permissions_claim(mut self) -> Self {
        self.permissions = None;
        self
    }

    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_string();
        self
    }

    pub fn audience(mut self, audience: &str) -> Self {
        self.audience = audience.to_string();
        self
    }

    pub fn expired(mut self) -> Self {
        self.exp = get_current_timestamp() - 3600;
        self
    }

    pub fn kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_string);
        self
    }

    /// Sign with a key the verifier does not trust, keeping the trusted kid
    pub fn signed_with_other_key(mut self) -> Self {
        self.pem = OTHER_KEY;
        self
    }

    pub fn build(self) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid;

        let claims = TestClaims {
            sub: "auth0|tester".to_string(),
            iss: self.issuer,
            aud: self.audience,
            iat: get_current_timestamp(),
            exp: self.exp,
            permissions: self.permissions,
        };

        let key = EncodingKey::from_rsa_pem(self.pem.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }
}

/// Valid token carrying `permissions`
pub fn token(permissions: &[&str]) -> String {
    TokenBuilder::new().permissions(permissions).build()
}

/// Valid token carrying every permission
pub fn admin_token() -> String {
    token(ALL_PERMISSIONS)
}

pub fn server_with_store(store: InMemoryStore) -> TestServer {
    let app = ServerBuilder::new()
        .with_store(store)
        .with_verifier(verifier())
        .build()
        .expect("Failed to build app");

    TestServer::try_new(app).expect("Failed to create test server")
}

pub fn server() -> TestServer {
    server_with_store(InMemoryStore::new())
}

/// Create a movie through the API and return its id
pub async fn create_movie(server: &TestServer, title: &str, release_date: &str) -> i64 {
    let response = server
        .post("/movies")
        .authorization_bearer(admin_token())
        .json(&serde_json::json!({ "title": title, "release_date": release_date }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["movie"]["id"].as_i64().unwrap()
}

/// Create an actor through the API and return their id
pub async fn create_actor(server: &TestServer, name: &str, age: i32, gender: Option<&str>) -> i64 {
    let response = server
        .post("/actors")
        .authorization_bearer(admin_token())
        .json(&serde_json::json!({ "name": name, "age": age, "gender": gender }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["actor"]["id"].as_i64().unwrap()
}
