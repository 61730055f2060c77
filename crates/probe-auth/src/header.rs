//! Authorization header construction and secret previews.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Credentials presented to the MCP server on every request
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic <base64(user:pass)>`
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

impl Credentials {
    /// Bearer credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer(token.into())
    }

    /// Basic credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header
    pub fn authorization_header(&self) -> String {
        match self {
            Credentials::Bearer(token) => format!("Bearer {}", token),
            Credentials::Basic { username, password } => basic_header(username, password),
        }
    }

    /// Human-readable scheme name
    pub fn scheme(&self) -> &'static str {
        match self {
            Credentials::Bearer(_) => "Bearer token",
            Credentials::Basic { .. } => "Basic auth",
        }
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Bearer(token) => {
                f.debug_tuple("Bearer").field(&token_preview(token, 10, 10)).finish()
            }
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// `Basic` header value for a username/password pair
pub fn basic_header(username: &str, password: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}

/// Shorten a token to its first `head` and last `tail` characters.
///
/// Tokens too short to shorten meaningfully are returned unchanged.
pub fn token_preview(token: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= head + tail + 5 {
        return token.to_string();
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}

/// Mask a tenant or client id as `xxxxxxxx...yyyy`
pub fn mask_identifier(id: &str) -> String {
    token_preview(id, 8, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let creds = Credentials::bearer("abc.def.ghi");
        assert_eq!(creds.authorization_header(), "Bearer abc.def.ghi");
        assert_eq!(creds.scheme(), "Bearer token");
    }

    #[test]
    fn test_basic_header() {
        assert_eq!(basic_header("neo4j", "password"), "Basic bmVvNGo6cGFzc3dvcmQ=");
    }

    #[test]
    fn test_token_preview() {
        let token = "eyJhbGciOiJSUzI1NiJ9.payload.signature-part";
        assert_eq!(token_preview(token, 10, 10), "eyJhbGciOi...ature-part");
        assert_eq!(token_preview("short", 10, 10), "short");
    }

    #[test]
    fn test_mask_identifier() {
        let tenant = "0b1c2d3e-4f50-6172-8394-a5b6c7d8e9f0";
        assert_eq!(mask_identifier(tenant), "0b1c2d3e...e9f0");
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::basic("neo4j", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("neo4j"));
        assert!(!debug.contains("hunter2"));
    }
}
