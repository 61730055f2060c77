//! Error types for token acquisition and inspection.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider rejected the token request
    #[error("Failed to acquire token: {error}: {description}")]
    TokenRequest {
        /// OAuth2 error code (e.g. `invalid_client`)
        error: String,
        /// Provider description, usually carrying an AADSTS code
        description: String,
    },

    /// The token response lacked the expected token
    #[error("No {0} in token response")]
    MissingToken(&'static str),

    /// Network or HTTP failure talking to the identity provider
    #[error("Identity provider request failed: {0}")]
    Http(String),

    /// The token is not a three-segment JWT or a segment is not JSON
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The token header carries no `kid`
    #[error("No 'kid' in token header")]
    MissingKeyId,

    /// The key set holds no key with the token's `kid`
    #[error("No key found for kid={0}")]
    KeyNotFound(String),

    /// The token's `exp` is in the past
    #[error("Token has expired")]
    Expired,

    /// `aud` does not match
    #[error("Invalid audience: expected {0}")]
    InvalidAudience(String),

    /// `iss` is not one of the accepted issuers
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// Signature check failed
    #[error("Signature mismatch")]
    InvalidSignature,

    /// Any other decoding or key construction failure
    #[error("Decode error: {0}")]
    Decode(String),
}

impl AuthError {
    /// Remediation hint for well-known Entra failures
    pub fn diagnosis(&self) -> Option<&'static str> {
        let AuthError::TokenRequest { error, description } = self else {
            return None;
        };

        if description.contains("AADSTS650053") || error.to_lowercase().contains("invalid_resource")
        {
            Some(
                "Application ID URI not configured. Go to Azure Portal > App registrations > \
                 Expose an API > Add Application ID URI (api://{client_id})",
            )
        } else if description.contains("AADSTS7000215") {
            Some("Invalid client secret. Create a new secret in Azure Portal.")
        } else if description.contains("AADSTS700016") {
            Some("Application not found in tenant. Check the client id.")
        } else {
            None
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            AuthError::Http(format!("connection failed: {}", e))
        } else if e.is_timeout() {
            AuthError::Http("request timed out".to_string())
        } else {
            AuthError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::MalformedToken(format!("JSON parsing error: {}", e))
    }
}
