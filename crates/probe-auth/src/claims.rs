//! Claim inspection for Entra-issued tokens.
//!
//! Entra issues v1.0 and v2.0 tokens with different issuers, and Neo4j Aura
//! SSO is picky about issuer, audience and the presence of group/role claims.
//! [`analyze`] turns a claim set into the list of observations the
//! troubleshooting commands print.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Token format version (`ver` claim)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVersion {
    /// v1.0 tokens, issuer `https://sts.windows.net/{tenant}/`
    V1,
    /// v2.0 tokens, issuer `https://login.microsoftonline.com/{tenant}/v2.0`
    V2,
}

impl TokenVersion {
    /// Version of a claim set: `ver == "2.0"` is v2.0, anything else v1.0
    pub fn of(claims: &TokenClaims) -> Self {
        match claims.string("ver") {
            Some("2.0") => TokenVersion::V2,
            _ => TokenVersion::V1,
        }
    }

    /// Label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            TokenVersion::V1 => "v1.0",
            TokenVersion::V2 => "v2.0",
        }
    }
}

/// Issuer Entra puts in tokens of the given version
pub fn expected_issuer(tenant_id: &str, version: TokenVersion) -> String {
    match version {
        TokenVersion::V1 => format!("https://sts.windows.net/{}/", tenant_id),
        TokenVersion::V2 => format!("https://login.microsoftonline.com/{}/v2.0", tenant_id),
    }
}

/// Both issuers a tenant may use
pub fn valid_issuers(tenant_id: &str) -> Vec<String> {
    vec![
        expected_issuer(tenant_id, TokenVersion::V1),
        expected_issuer(tenant_id, TokenVersion::V2),
    ]
}

/// OpenID discovery document of a tenant
pub fn discovery_uri(tenant_id: &str) -> String {
    format!(
        "https://login.microsoftonline.com/{}/v2.0/.well-known/openid-configuration",
        tenant_id
    )
}

/// Read-only view over a claim set
#[derive(Debug, Clone)]
pub struct TokenClaims {
    raw: Value,
}

impl TokenClaims {
    /// Wrap decoded claims
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Underlying JSON
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// String claim
    pub fn string(&self, name: &str) -> Option<&str> {
        self.raw.get(name).and_then(Value::as_str)
    }

    /// Numeric (epoch seconds) claim
    pub fn timestamp(&self, name: &str) -> Option<i64> {
        self.raw.get(name).and_then(Value::as_i64)
    }

    /// Array-of-strings claim; a missing or empty claim yields an empty list
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.raw.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Issuer
    pub fn issuer(&self) -> Option<&str> {
        self.string("iss")
    }

    /// Audiences; `aud` may be a string or an array
    pub fn audiences(&self) -> Vec<String> {
        self.list("aud")
    }

    /// Subject
    pub fn subject(&self) -> Option<&str> {
        self.string("sub")
    }

    /// `email`, falling back to `preferred_username`
    pub fn email(&self) -> Option<&str> {
        self.string("email").or_else(|| self.string("preferred_username"))
    }

    /// Group ids
    pub fn groups(&self) -> Vec<String> {
        self.list("groups")
    }

    /// App roles
    pub fn roles(&self) -> Vec<String> {
        self.list("roles")
    }

    /// Delegated scopes (space separated in `scp`)
    pub fn scopes(&self) -> Vec<String> {
        self.string("scp")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Token format version
    pub fn version(&self) -> TokenVersion {
        TokenVersion::of(self)
    }

    /// A time claim as UTC
    pub fn datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        self.timestamp(name)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Time left until `exp`, negative once expired
    pub fn expires_in(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.datetime("exp").map(|exp| exp - now)
    }
}

/// Severity of a [`Finding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Matches expectations
    Ok,
    /// Worth knowing, not necessarily wrong
    Info,
    /// Likely to break Neo4j SSO
    Issue,
}

/// One observation about a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Severity
    pub severity: Severity,
    /// Short message
    pub message: String,
    /// Optional remediation
    pub hint: Option<String>,
}

impl Finding {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Outcome of [`analyze`]
#[derive(Debug, Clone)]
pub struct ClaimReport {
    /// Detected token version
    pub version: TokenVersion,
    /// Issuer expected for that version
    pub expected_issuer: String,
    /// All observations, in check order
    pub findings: Vec<Finding>,
}

impl ClaimReport {
    /// Findings of severity [`Severity::Issue`]
    pub fn issues(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Issue)
    }

    /// Whether nothing looks wrong
    pub fn is_clean(&self) -> bool {
        self.issues().next().is_none()
    }
}

/// Compare a claim set against what Neo4j SSO expects for this registration
pub fn analyze(claims: &TokenClaims, tenant_id: &str, client_id: &str) -> ClaimReport {
    let version = claims.version();
    let expected = expected_issuer(tenant_id, version);
    let mut findings = Vec::new();

    match claims.issuer() {
        Some(iss) if iss == expected => {
            findings.push(Finding::new(Severity::Ok, format!("Issuer matches expected: {}", expected)))
        }
        actual => findings.push(Finding::new(
            Severity::Info,
            format!(
                "Issuer {} differs from expected {}",
                actual.unwrap_or("NOT FOUND"),
                expected
            ),
        )),
    }

    let audiences = claims.audiences();
    let app_uri = format!("api://{}", client_id);
    if audiences.iter().any(|a| a == client_id || *a == app_uri) {
        findings.push(Finding::new(Severity::Ok, "Audience matches client id"));
    } else {
        findings.push(Finding::new(
            Severity::Info,
            format!("Audience should match client id {}", client_id),
        ));
    }

    if claims.groups().is_empty() && claims.roles().is_empty() {
        findings.push(
            Finding::new(
                Severity::Issue,
                "Neither groups nor roles claims are present in the token",
            )
            .with_hint(
                "Neo4j Aura SSO may require groups or roles for authorization. Add a groups \
                 claim under App registrations > Token configuration, or define app roles \
                 in the manifest.",
            ),
        );
    }

    if claims.email().is_none() {
        findings.push(
            Finding::new(Severity::Issue, "No email or preferred_username claim found")
                .with_hint("Ensure the app requests the 'email' and 'profile' scopes."),
        );
    }

    ClaimReport {
        version,
        expected_issuer: expected,
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TENANT: &str = "tenant-123";
    const CLIENT: &str = "client-456";

    #[test]
    fn test_version_and_issuer() {
        let v2 = TokenClaims::new(json!({"ver": "2.0"}));
        assert_eq!(v2.version(), TokenVersion::V2);
        assert_eq!(
            expected_issuer(TENANT, TokenVersion::V2),
            "https://login.microsoftonline.com/tenant-123/v2.0"
        );

        let v1 = TokenClaims::new(json!({"ver": "1.0"}));
        assert_eq!(v1.version(), TokenVersion::V1);
        assert_eq!(
            expected_issuer(TENANT, TokenVersion::V1),
            "https://sts.windows.net/tenant-123/"
        );

        assert_eq!(TokenClaims::new(json!({})).version(), TokenVersion::V1);
    }

    #[test]
    fn test_audience_string_or_array() {
        let single = TokenClaims::new(json!({"aud": "api://x"}));
        assert_eq!(single.audiences(), vec!["api://x"]);

        let many = TokenClaims::new(json!({"aud": ["a", "b"]}));
        assert_eq!(many.audiences(), vec!["a", "b"]);
    }

    #[test]
    fn test_email_fallback_and_scopes() {
        let claims = TokenClaims::new(json!({
            "preferred_username": "alice@example.com",
            "scp": "User.Read openid"
        }));
        assert_eq!(claims.email(), Some("alice@example.com"));
        assert_eq!(claims.scopes(), vec!["User.Read", "openid"]);
    }

    #[test]
    fn test_expires_in() {
        let claims = TokenClaims::new(json!({"exp": 1_700_003_600}));
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(claims.expires_in(now).unwrap().num_seconds(), 3600);
    }

    #[test]
    fn test_analyze_clean_v2_token() {
        let claims = TokenClaims::new(json!({
            "ver": "2.0",
            "iss": "https://login.microsoftonline.com/tenant-123/v2.0",
            "aud": CLIENT,
            "email": "alice@example.com",
            "groups": ["g1"]
        }));

        let report = analyze(&claims, TENANT, CLIENT);
        assert_eq!(report.version, TokenVersion::V2);
        assert!(report.is_clean());
        assert_eq!(report.findings[0].severity, Severity::Ok);
        assert_eq!(report.findings[1].severity, Severity::Ok);
    }

    #[test]
    fn test_analyze_m2m_token_without_user_claims() {
        let claims = TokenClaims::new(json!({
            "iss": "https://sts.windows.net/other-tenant/",
            "aud": "api://client-456",
            "roles": ["Neo4j.Reader"]
        }));

        let report = analyze(&claims, TENANT, CLIENT);
        assert_eq!(report.findings[0].severity, Severity::Info);
        assert_eq!(report.findings[1].severity, Severity::Ok);

        let issues: Vec<_> = report.issues().collect();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("email"));
    }

    #[test]
    fn test_analyze_flags_missing_groups_and_roles() {
        let claims = TokenClaims::new(json!({"email": "a@b.c"}));
        let report = analyze(&claims, TENANT, CLIENT);
        let issue = report.issues().next().unwrap();
        assert!(issue.message.contains("groups nor roles"));
        assert!(issue.hint.is_some());
    }
}
