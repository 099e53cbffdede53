//! Firebase ID token authentication.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// How long fetched keys are trusted.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Minimum gap between refreshes triggered by an unknown key id.
const UNKNOWN_KID_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Claims of a verified Firebase ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseClaims {
    pub sub: String,
    pub email: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller. The uid scopes every persistence path.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl From<FirebaseClaims> for AuthUser {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Default)]
struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeySet {
    fn is_stale(&self) -> bool {
        self.fetched_at.map_or(true, |t| t.elapsed() > JWKS_CACHE_TTL)
    }

    fn may_refresh_for_unknown_kid(&self) -> bool {
        self.fetched_at
            .map_or(true, |t| t.elapsed() > UNKNOWN_KID_REFRESH_INTERVAL)
    }
}

/// Verifies Firebase ID tokens against a lazily fetched JWKS.
pub struct JwksCache {
    http: Client,
    jwks_url: String,
    project_id: String,
    keys: RwLock<KeySet>,
}

impl JwksCache {
    pub fn new(
        project_id: impl Into<String>,
        jwks_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build JWKS client: {e}")))?;

        Ok(Self {
            http,
            jwks_url: jwks_url.into(),
            project_id: project_id.into(),
            keys: RwLock::new(KeySet::default()),
        })
    }

    /// Fetch the current key set, replacing the cached one.
    pub async fn refresh_keys(&self) -> Result<usize, ApiError> {
        debug!(url = %self.jwks_url, "Refreshing JWKS keys");

        let fetch_failed = |e: reqwest::Error| ApiError::internal(format!("JWKS fetch failed: {e}"));
        let jwks: JwksResponse = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_failed)?
            .json()
            .await
            .map_err(fetch_failed)?;

        let mut keys = HashMap::with_capacity(jwks.keys.len());
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => warn!(kid = %jwk.kid, error = %e, "Skipping unusable JWKS key"),
            }
        }

        let count = keys.len();
        *self.keys.write().await = KeySet {
            keys,
            fetched_at: Some(Instant::now()),
        };
        debug!(count, "Refreshed JWKS keys");
        Ok(count)
    }

    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        let needs_refresh = {
            let set = self.keys.read().await;
            set.is_stale() || (!set.keys.contains_key(kid) && set.may_refresh_for_unknown_kid())
        };

        if needs_refresh {
            if let Err(e) = self.refresh_keys().await {
                warn!(error = %e, "Failed to refresh JWKS keys");
            }
        }

        self.keys.read().await.keys.get(kid).cloned()
    }

    /// Verify signature, issuer, audience and expiry.
    pub async fn verify_token(&self, token: &str) -> Result<FirebaseClaims, ApiError> {
        if self.project_id.is_empty() {
            return Err(ApiError::unauthorized("Token verification is not configured"));
        }

        let header = decode_header(token)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token header: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| ApiError::unauthorized("Token missing key ID"))?;
        let key = self
            .get_key(&kid)
            .await
            .ok_or_else(|| ApiError::unauthorized("Unknown key ID"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)]);
        validation.set_audience(&[&self.project_id]);

        let data = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| ApiError::unauthorized(format!("Token validation failed: {e}")))?;
        if data.claims.sub.is_empty() {
            return Err(ApiError::unauthorized("Token has no subject"));
        }

        Ok(data.claims)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.jwks.verify_token(token).await?;
        Ok(AuthUser::from(claims))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub const PROJECT_ID: &str = "reelgen-test";
    pub const KID: &str = "test-key-1";
    pub const JWKS: &str = include_str!("../testdata/jwks.json");
    const PRIVATE_KEY: &str = include_str!("../testdata/jwt_rsa_private.pem");

    /// Sign a Firebase-shaped ID token with the test key.
    pub fn sign_token(uid: &str, kid: &str, audience: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = json!({
            "sub": uid,
            "email": format!("{uid}@example.com"),
            "iss": format!("https://securetoken.google.com/{audience}"),
            "aud": audience,
            "iat": now,
            "exp": now + 3600,
        });
        let mut header = Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }
}
