//! Azure Entra ID token acquisition.
//!
//! Two OAuth2 grants against the tenant's v2.0 token endpoint:
//!
//! - client credentials (M2M), the application authenticates as itself
//! - resource owner password credentials (ROPC), used only by the SSO
//!   debugging commands to obtain a user ID token
//!
//! Tokens are requested once per run. Nothing is cached or refreshed.

use crate::error::AuthError;
use crate::header::mask_identifier;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Public Entra authority host
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Scopes requested by the ROPC flow (ID token plus profile claims)
pub const ROPC_SCOPES: [&str; 4] = ["openid", "profile", "email", "User.Read"];

/// Default timeout for token requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `.default` scope for a client-credentials request.
///
/// Uses the custom audience when given, otherwise the application ID URI
/// `api://{client_id}`.
pub fn default_scope(client_id: &str, audience: Option<&str>) -> String {
    match audience.filter(|a| !a.is_empty()) {
        Some(audience) => format!("{}/.default", audience.trim_end_matches('/')),
        None => format!("api://{}/.default", client_id),
    }
}

/// Successful token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token (JWT)
    #[serde(default)]
    pub access_token: Option<String>,
    /// ID token, only for flows that include `openid`
    #[serde(default)]
    pub id_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Usually "Bearer"
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// The access token, or an error when the provider omitted it
    pub fn access_token(&self) -> Result<&str, AuthError> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken("access_token"))
    }

    /// The ID token, or an error when the provider omitted it
    pub fn id_token(&self) -> Result<&str, AuthError> {
        self.id_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken("id_token"))
    }
}

/// OAuth2 error body
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Confidential client registered in an Entra tenant
pub struct EntraApp {
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

impl EntraApp {
    /// Create a client against the public Entra authority
    pub fn new(tenant_id: &str, client_id: &str, client_secret: &str) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            http,
        })
    }

    /// Point the client at another authority host (sovereign clouds, tests)
    pub fn with_authority_host(mut self, host: &str) -> Self {
        self.authority_host = host.trim_end_matches('/').to_string();
        self
    }

    /// Tenant authority URL
    pub fn authority(&self) -> String {
        format!("{}/{}", self.authority_host, self.tenant_id)
    }

    /// v2.0 token endpoint
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority())
    }

    /// Client id of the registration
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Acquire an application token with the client-credentials grant
    pub async fn acquire_client_credentials(&self, scope: &str) -> Result<TokenResponse, AuthError> {
        info!(
            tenant = %mask_identifier(&self.tenant_id),
            client = %mask_identifier(&self.client_id),
            scope,
            "Requesting client-credentials token"
        );

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self.request_token(&form).await?;
        response.access_token()?;
        Ok(response)
    }

    /// Acquire user tokens with the ROPC grant.
    ///
    /// Only for test tenants; interactive flows should be used for real users.
    pub async fn acquire_by_password(
        &self,
        username: &str,
        password: &str,
        scopes: &[&str],
    ) -> Result<TokenResponse, AuthError> {
        info!(
            tenant = %mask_identifier(&self.tenant_id),
            username,
            "Requesting ROPC token"
        );

        let scope = scopes.join(" ");
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", username),
            ("password", password),
            ("scope", scope.as_str()),
        ];

        self.request_token(&form).await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = self.token_endpoint();
        debug!(%url, "POST token endpoint");

        let response = self.http.post(&url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: TokenErrorBody = serde_json::from_str(&body).unwrap_or(TokenErrorBody {
                error: None,
                error_description: None,
            });
            return Err(AuthError::TokenRequest {
                error: parsed.error.unwrap_or_else(|| format!("http_{}", status.as_u16())),
                description: parsed
                    .error_description
                    .unwrap_or_else(|| body.chars().take(200).collect()),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::Http(format!("invalid token response: {}", e)))?;
        debug!(expires_in = ?token.expires_in, "Token response received");
        Ok(token)
    }
}
