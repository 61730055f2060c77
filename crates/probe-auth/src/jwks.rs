//! Signature verification against the tenant's published keys.
//!
//! The steps are exposed one by one so callers can report each as its own
//! check: discover the JWKS URI, fetch the key set, pick the key named by the
//! token's `kid`, then verify. Keys are fetched fresh on every run.

use crate::claims::valid_issuers;
use crate::entra::DEFAULT_AUTHORITY_HOST;
use crate::error::AuthError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Timeout for discovery and key fetches
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Subset of the OpenID discovery document
#[derive(Debug, Deserialize)]
struct OpenIdConfiguration {
    jwks_uri: String,
}

/// Fetches discovery documents and key sets
pub struct JwksClient {
    authority_host: String,
    http: reqwest::Client,
}

impl JwksClient {
    /// Client against the public Entra authority
    pub fn new() -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http,
        })
    }

    /// Use another authority host
    pub fn with_authority_host(mut self, host: &str) -> Self {
        self.authority_host = host.trim_end_matches('/').to_string();
        self
    }

    /// Discovery document URL of a tenant
    pub fn discovery_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/v2.0/.well-known/openid-configuration",
            self.authority_host, tenant_id
        )
    }

    /// Read `jwks_uri` from the tenant's discovery document
    pub async fn discover_jwks_uri(&self, tenant_id: &str) -> Result<String, AuthError> {
        let url = self.discovery_url(tenant_id);
        debug!(%url, "GET OpenID configuration");
        let config: OpenIdConfiguration = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(config.jwks_uri)
    }

    /// Download the key set
    pub async fn fetch_key_set(&self, jwks_uri: &str) -> Result<JwkSet, AuthError> {
        debug!(url = %jwks_uri, "GET JWKS");
        let set: JwkSet = self
            .http
            .get(jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(keys = set.keys.len(), "Fetched key set");
        Ok(set)
    }
}

/// `kid` from the token header
pub fn key_id(token: &str) -> Result<String, AuthError> {
    let header = decode_header(token).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
    header.kid.ok_or(AuthError::MissingKeyId)
}

/// Key in `set` whose `kid` matches
pub fn select_key<'a>(set: &'a JwkSet, kid: &str) -> Result<&'a Jwk, AuthError> {
    set.find(kid)
        .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
}

/// Expected audience and issuers for verification
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    audience: String,
    issuers: Vec<String>,
    algorithms: Vec<Algorithm>,
}

impl TokenVerifier {
    /// Verifier for explicit audience and issuers, RS256 only
    pub fn new(audience: impl Into<String>, issuers: Vec<String>) -> Self {
        Self {
            audience: audience.into(),
            issuers,
            algorithms: vec![Algorithm::RS256],
        }
    }

    /// Verifier for an M2M token of the given app registration.
    ///
    /// The audience is the application ID URI; both v1.0 and v2.0 issuers
    /// of the tenant are accepted.
    pub fn for_m2m(tenant_id: &str, client_id: &str) -> Self {
        Self::new(format!("api://{}", client_id), valid_issuers(tenant_id))
    }

    /// Accept other algorithms
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Expected audience
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Build the decoding key for `jwk`
    pub fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
        DecodingKey::from_jwk(jwk).map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Check signature, `exp`, `iss` and `aud`; returns the claims
    pub fn verify(&self, token: &str, key: &DecodingKey) -> Result<Value, AuthError> {
        let primary = self.algorithms.first().copied().unwrap_or(Algorithm::RS256);
        let mut validation = Validation::new(primary);
        validation.algorithms = self.algorithms.clone();
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(self.issuers.as_slice());

        decode::<Value>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience(self.audience.clone()),
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Decode(e.to_string()),
            })
    }
}
