//! Bearer-token authentication against the hosted auth provider's JWKS.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use daybook_core::UserId;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::error::AppError;

/// The caller of a protected route
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: Option<String>,
    pub session_id: Option<String>,
}

impl AuthenticatedUser {
    /// Name shown in export envelopes
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or_else(|| self.user_id.as_str())
    }
}

#[derive(Clone)]
pub struct SupabaseJwtVerifier {
    client: reqwest::Client,
    config: Arc<AppConfig>,
    cache: Arc<RwLock<JwksCache>>,
}

impl SupabaseJwtVerifier {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            cache: Arc::new(RwLock::new(JwksCache::default())),
        }
    }

    pub async fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|error| {
            AppError::unauthorized(format!("Token header decode failed: {}", sanitize(&error)))
        })?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::unauthorized("Token header missing `kid`"))?;

        let key = self.find_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        // Audience and temporal claims are checked by `check_claims` with our own skew
        validation.validate_aud = false;
        validation.validate_exp = false;
        validation.set_issuer(&[self.config.supabase_jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "iss"]);

        let decoded = decode::<AccessClaims>(token, &key, &validation).map_err(|error| {
            AppError::unauthorized(format!("Token validation failed: {}", sanitize(&error)))
        })?;

        check_claims(
            decoded.claims,
            &self.config.supabase_jwt_audience,
            self.config.auth_clock_skew,
            chrono::Utc::now().timestamp(),
        )
    }

    async fn find_key(&self, kid: &str) -> Result<DecodingKey, AppError> {
        let ttl = self.config.jwks_cache_ttl;
        if let Some(key) = self.cache.read().await.fresh_key(kid, ttl) {
            return Ok(key);
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(key) = cache.fresh_key(kid, ttl) {
            return Ok(key);
        }

        cache.keys = fetch_jwks(&self.client, &self.config.supabase_jwks_url).await?;
        cache.fetched_at = Some(Instant::now());
        tracing::info!(keys = cache.keys.len(), "Refreshed JWKS signing keys");

        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Signing key not found in Supabase JWKS"))
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Authorization header is not valid UTF-8"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::unauthorized("Authorization header must be `Bearer <token>`"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::unauthorized(
            "Authorization scheme must be `Bearer`",
        ));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("Bearer token is empty"));
    }

    Ok(token)
}

#[derive(Default)]
struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl JwksCache {
    fn fresh_key(&self, kid: &str, ttl: Duration) -> Option<DecodingKey> {
        let fresh = self.fetched_at.is_some_and(|at| at.elapsed() <= ttl);
        if fresh {
            self.keys.get(kid).cloned()
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: Option<String>,
    #[serde(rename = "use")]
    usage: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: String,
    aud: Option<Value>,
    role: Option<String>,
    email: Option<String>,
    exp: Option<i64>,
    iat: Option<i64>,
    nbf: Option<i64>,
    jti: Option<String>,
    session_id: Option<String>,
}

/// Validate decoded claims and turn them into the request's user.
fn check_claims(
    claims: AccessClaims,
    audience: &str,
    clock_skew: Duration,
    now: i64,
) -> Result<AuthenticatedUser, AppError> {
    if !audience_matches(claims.aud.as_ref(), audience) {
        return Err(AppError::unauthorized("Token audience is not allowed"));
    }
    if claims.role.as_deref() != Some("authenticated") {
        return Err(AppError::unauthorized("Token role is not allowed"));
    }

    let skew = i64::try_from(clock_skew.as_secs()).unwrap_or(0);
    let exp = claims
        .exp
        .ok_or_else(|| AppError::unauthorized("Token missing `exp` claim"))?;
    if exp <= now.saturating_sub(skew) {
        return Err(AppError::unauthorized("Token is expired"));
    }
    let iat = claims
        .iat
        .ok_or_else(|| AppError::unauthorized("Token missing `iat` claim"))?;
    if iat > now.saturating_add(skew) {
        return Err(AppError::unauthorized("Token `iat` is in the future"));
    }
    if claims.nbf.is_some_and(|nbf| nbf > now.saturating_add(skew)) {
        return Err(AppError::unauthorized("Token is not yet valid"));
    }

    let user_id =
        UserId::new(claims.sub).map_err(|_| AppError::unauthorized("Token subject is missing"))?;
    let email = claims.email.filter(|email| !email.trim().is_empty());

    Ok(AuthenticatedUser {
        user_id,
        email,
        session_id: claims.session_id.or(claims.jti),
    })
}

async fn fetch_jwks(
    client: &reqwest::Client,
    jwks_url: &str,
) -> Result<HashMap<String, DecodingKey>, AppError> {
    let response = client
        .get(jwks_url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|error| {
            AppError::external(format!("JWKS request failed: {}", sanitize(&error)))
        })?;

    if !response.status().is_success() {
        return Err(AppError::external(format!(
            "JWKS request failed with HTTP {}",
            response.status().as_u16()
        )));
    }

    let payload = response.json::<JwksDocument>().await.map_err(|error| {
        AppError::external(format!("JWKS JSON parse failed: {}", sanitize(&error)))
    })?;

    let keys = usable_keys(payload)?;
    if keys.is_empty() {
        return Err(AppError::external(
            "JWKS did not include any usable RSA signing keys",
        ));
    }
    Ok(keys)
}

/// RSA signing keys with a `kid`; anything else is skipped.
fn usable_keys(document: JwksDocument) -> Result<HashMap<String, DecodingKey>, AppError> {
    let mut out = HashMap::new();
    for key in document.keys {
        let (Some(kid), Some(n), Some(e)) = (key.kid, key.n, key.e) else {
            continue;
        };
        if key.kty.as_deref() != Some("RSA") {
            continue;
        }
        if key.usage.as_deref().is_some_and(|usage| usage != "sig") {
            continue;
        }
        let decoding = DecodingKey::from_rsa_components(&n, &e).map_err(|error| {
            AppError::external(format!("Invalid JWKS RSA key: {}", sanitize(&error)))
        })?;
        out.insert(kid, decoding);
    }
    Ok(out)
}

fn audience_matches(aud: Option<&Value>, expected: &str) -> bool {
    match aud {
        Some(Value::String(value)) => value == expected,
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(|value| value == expected),
        _ => false,
    }
}

fn sanitize(error: &impl std::fmt::Display) -> String {
    error.to_string().replace('\n', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn claims() -> AccessClaims {
        AccessClaims {
            sub: "8d2f0c7e-user".to_string(),
            aud: Some(Value::String("authenticated".to_string())),
            role: Some("authenticated".to_string()),
            email: Some("writer@example.com".to_string()),
            exp: Some(NOW + 300),
            iat: Some(NOW - 10),
            nbf: None,
            jti: Some("jti-1".to_string()),
            session_id: None,
        }
    }

    fn check(claims: AccessClaims) -> Result<AuthenticatedUser, AppError> {
        check_claims(claims, "authenticated", Duration::from_secs(30), NOW)
    }

    #[test]
    fn bearer_token_extractor_accepts_standard_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("bearer abc.def.ghi"),
        );

        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn bearer_token_extractor_rejects_wrong_scheme_or_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer_token(&headers).is_err());

        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn valid_claims_become_the_user() {
        let user = check(claims()).unwrap();
        assert_eq!(user.user_id.as_str(), "8d2f0c7e-user");
        assert_eq!(user.label(), "writer@example.com");
        assert_eq!(user.session_id.as_deref(), Some("jti-1"));
    }

    #[test]
    fn label_falls_back_to_subject() {
        let user = check(AccessClaims {
            email: Some("  ".to_string()),
            ..claims()
        })
        .unwrap();
        assert_eq!(user.label(), "8d2f0c7e-user");
    }

    #[test]
    fn audience_and_role_are_enforced() {
        let wrong_aud = check(AccessClaims {
            aud: Some(Value::Array(vec![Value::String("anon".to_string())])),
            ..claims()
        });
        assert!(wrong_aud.unwrap_err().to_string().contains("audience"));

        let anon = check(AccessClaims {
            role: Some("anon".to_string()),
            ..claims()
        });
        assert!(anon.unwrap_err().to_string().contains("role"));

        let blank_sub = check(AccessClaims {
            sub: " ".to_string(),
            ..claims()
        });
        assert!(blank_sub.unwrap_err().to_string().contains("subject"));
    }

    #[test]
    fn temporal_claims_honor_skew() {
        let missing = check(AccessClaims {
            exp: None,
            ..claims()
        });
        assert!(missing.unwrap_err().to_string().contains("missing `exp`"));

        // Expired 20s ago, inside the 30s skew
        assert!(check(AccessClaims {
            exp: Some(NOW - 20),
            ..claims()
        })
        .is_ok());
        assert!(check(AccessClaims {
            exp: Some(NOW - 40),
            ..claims()
        })
        .is_err());

        let future = check(AccessClaims {
            iat: Some(NOW + 120),
            ..claims()
        });
        assert!(future.unwrap_err().to_string().contains("future"));

        let early = check(AccessClaims {
            nbf: Some(NOW + 120),
            ..claims()
        });
        assert!(early.unwrap_err().to_string().contains("not yet valid"));
    }

    #[test]
    fn jwks_keeps_only_rsa_signing_keys() {
        let document: JwksDocument = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kid": "ec", "kty": "EC", "use": "sig", "n": "AQAB", "e": "AQAB" },
                { "kid": "enc", "kty": "RSA", "use": "enc", "n": "AQAB", "e": "AQAB" },
                { "kty": "RSA", "use": "sig", "n": "AQAB", "e": "AQAB" },
                { "kid": "rsa", "kty": "RSA", "use": "sig", "n": "AQAB", "e": "AQAB" }
            ]
        }))
        .unwrap();

        let keys = usable_keys(document).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("rsa"));
    }

    #[test]
    fn stale_cache_misses() {
        let mut cache = JwksCache::default();
        assert!(cache.fresh_key("rsa", Duration::from_secs(300)).is_none());

        cache
            .keys
            .insert("rsa".to_string(), DecodingKey::from_secret(b"test"));
        cache.fetched_at = Some(Instant::now());
        assert!(cache.fresh_key("rsa", Duration::from_secs(300)).is_some());
        assert!(cache.fresh_key("other", Duration::from_secs(300)).is_none());
    }
}
