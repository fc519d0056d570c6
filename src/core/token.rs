//! Bearer token verification
//!
//! Verification order:
//! 1. the token header decodes and names an allowed algorithm,
//! 2. the header `kid` resolves to a trusted key,
//! 3. signature, audience, issuer and expiry validate.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::core::auth::{AuthError, Claims};
use crate::core::jwks::KeySource;

/// Turns a raw bearer token into verified claims
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Verifies signed JWTs against a trusted key set
pub struct JwtVerifier {
    keys: KeySource,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
}

impl JwtVerifier {
    /// Create a verifier accepting RS256 tokens for `audience` issued by `issuer`
    pub fn new(keys: KeySource, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
        }
    }

    /// Replace the set of accepted signing algorithms
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| {
            AuthError::InvalidHeader("Unable to parse authentication token.".to_string())
        })?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidHeader(format!(
                "Unsupported signing algorithm {:?}.",
                header.alg
            )));
        }

        let Some(kid) = header.kid else {
            return Err(AuthError::InvalidHeader("Authorization malformed.".to_string()));
        };

        let jwk = self
            .keys
            .find(&kid)
            .await?
            .ok_or_else(|| AuthError::InvalidHeader("Unable to find the appropriate key.".to_string()))?;

        let key = DecodingKey::from_jwk(&jwk).map_err(|_| {
            AuthError::InvalidHeader("Unable to find the appropriate key.".to_string())
        })?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(classify)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims(
            "Incorrect claims. Please, check the audience and issuer.".to_string(),
        ),
        ErrorKind::InvalidSignature => {
            AuthError::InvalidClaims("Token signature is invalid.".to_string())
        }
        _ => AuthError::InvalidClaims("Unable to parse authentication token.".to_string()),
    }
}
