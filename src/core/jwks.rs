//! Trusted signing keys
//!
//! Keys come either from a fixed [`JwkSet`] or from the identity authority's
//! JWKS endpoint. Remote sets are cached in process for a TTL and reloaded
//! early when a token names a key id the cache does not know (key rotation).
//! Fetches are throttled by [`REFRESH_COOLDOWN`], and a failed refresh keeps
//! serving the last fetched set.

use jsonwebtoken::jwk::{Jwk, JwkSet};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use crate::core::auth::AuthError;

/// Minimum time between two fetches of the remote key set
pub const REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where verification keys come from
pub enum KeySource {
    /// Fixed key set, never refreshed
    Local(JwkSet),

    /// Key set fetched from the authority and cached
    Remote(RemoteJwkSet),
}

impl KeySource {
    /// Use a fixed key set
    pub fn local(keys: JwkSet) -> Self {
        KeySource::Local(keys)
    }

    /// Fetch keys from `url`, caching them for `ttl`
    pub fn remote(url: Url, ttl: Duration) -> Self {
        KeySource::Remote(RemoteJwkSet::new(url, ttl))
    }

    /// Find the key with the given id
    pub async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        match self {
            KeySource::Local(keys) => Ok(keys.find(kid).cloned()),
            KeySource::Remote(remote) => remote.find(kid).await,
        }
    }
}

struct CachedJwks {
    keys: JwkSet,
    /// Last successful fetch; drives the TTL
    fetched_at: Instant,
    /// Last fetch attempt, successful or not; drives the cooldown
    checked_at: Instant,
}

/// JWKS fetched over HTTP with a TTL cache
///
/// When the authority cannot be reached the last fetched set keeps being
/// served, and the fetch is retried once per cooldown.
pub struct RemoteJwkSet {
    url: Url,
    client: reqwest::Client,
    ttl: Duration,
    cooldown: Duration,
    cache: RwLock<Option<CachedJwks>>,
}

impl RemoteJwkSet {
    pub fn new(url: Url, ttl: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            url,
            client,
            ttl,
            cooldown: REFRESH_COOLDOWN,
            cache: RwLock::new(None),
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Replace [`REFRESH_COOLDOWN`]
    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Look up a key, fetching the set when the cache is cold, stale, or
    /// does not contain `kid`
    pub async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let fresh = cached.fetched_at.elapsed() < self.ttl;
                let cooling = cached.checked_at.elapsed() < self.cooldown;
                match cached.keys.find(kid) {
                    Some(jwk) if fresh || cooling => return Ok(Some(jwk.clone())),
                    None if cooling => return Ok(None),
                    _ => {}
                }
            }
        }

        let keys = self.reload().await?;
        Ok(keys.find(kid).cloned())
    }

    async fn reload(&self) -> Result<JwkSet, AuthError> {
        let mut cache = self.cache.write().await;

        // Another request may have reloaded while this one waited for the lock
        if let Some(cached) = cache.as_ref() {
            if cached.checked_at.elapsed() < self.cooldown {
                return Ok(cached.keys.clone());
            }
        }

        match self.fetch().await {
            Ok(keys) => {
                tracing::info!(url = %self.url, keys = keys.keys.len(), "fetched signing keys");
                let now = Instant::now();
                *cache = Some(CachedJwks {
                    keys: keys.clone(),
                    fetched_at: now,
                    checked_at: now,
                });
                Ok(keys)
            }
            Err(err) => match cache.as_mut() {
                Some(cached) => {
                    tracing::warn!(
                        url = %self.url,
                        age_secs = cached.fetched_at.elapsed().as_secs(),
                        "keeping previously fetched signing keys"
                    );
                    cached.checked_at = Instant::now();
                    Ok(cached.keys.clone())
                }
                None => Err(err),
            },
        }
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let unavailable = |e: reqwest::Error| {
            tracing::warn!(url = %self.url, error = %e, "failed to fetch signing keys");
            AuthError::InvalidHeader("Unable to fetch signing keys.".to_string())
        };

        self.client
            .get(self.url.clone())
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json::<JwkSet>()
            .await
            .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_set(kid: &str) -> JwkSet {
        serde_json::from_value(serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": kid,
                "n": "AQAB",
                "e": "AQAB"
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_local_find() {
        let source = KeySource::local(key_set("k1"));

        assert!(source.find("k1").await.unwrap().is_some());
        assert!(source.find("k2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remote_unreachable_is_invalid_header() {
        let url = Url::parse("http://127.0.0.1:1/.well-known/jwks.json").unwrap();
        let source = KeySource::remote(url, Duration::from_secs(60));

        let err = source.find("k1").await.unwrap_err();
        assert_eq!(err.code(), "invalid_header");
        assert_eq!(err.to_string(), "Unable to fetch signing keys.");
    }

    async fn authority(responses: &[(u16, Option<u64>)]) -> (wiremock::MockServer, Url) {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        for (status, times) in responses {
            let template = ResponseTemplate::new(*status).set_body_json(key_set("k1"));
            let mock = Mock::given(method("GET")).and(path("/jwks.json")).respond_with(template);
            let mock = match times {
                Some(n) => mock.up_to_n_times(*n),
                None => mock,
            };
            mock.mount(&server).await;
        }
        let url = Url::parse(&format!("{}/jwks.json", server.uri())).unwrap();
        (server, url)
    }

    #[tokio::test]
    async fn test_remote_refetches_after_ttl() {
        let (server, url) = authority(&[(200, None)]).await;
        let set = RemoteJwkSet::new(url, Duration::from_millis(50))
            .with_refresh_cooldown(Duration::ZERO);

        assert!(set.find("k1").await.unwrap().is_some());
        assert!(set.find("k1").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(set.find("k1").await.unwrap().is_some());

        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_keeps_stale_keys_when_refresh_fails() {
        let (server, url) = authority(&[(200, Some(1)), (503, None)]).await;
        let set = RemoteJwkSet::new(url, Duration::from_millis(50))
            .with_refresh_cooldown(Duration::ZERO);

        assert!(set.find("k1").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(set.find("k1").await.unwrap().is_some());
        assert!(set.find("k2").await.unwrap().is_none());

        assert!(server.received_requests().await.unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_throttled() {
        let (server, url) = authority(&[(200, Some(1)), (503, None)]).await;
        let set = RemoteJwkSet::new(url, Duration::from_millis(50))
            .with_refresh_cooldown(Duration::from_millis(150));

        assert!(set.find("k1").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(200)).await;
        // Stale and past the cooldown: one failed attempt, stale keys served
        assert!(set.find("k1").await.unwrap().is_some());
        // Within the cooldown of that attempt: no new request
        assert!(set.find("k1").await.unwrap().is_some());
        assert!(set.find("k2").await.unwrap().is_none());

        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
