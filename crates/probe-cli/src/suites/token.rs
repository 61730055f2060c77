//! Token commands: acquire, decode and inspect.
//!
//! `inspect` is the SSO troubleshooting view. It decodes an ID token, lists
//! the claims Neo4j Aura cares about and prints the values to paste into the
//! Aura SSO configuration.

use crate::cli::{AcquireArgs, Flow, InspectArgs};
use crate::config::{present, EntraSettings};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::suites::SuiteContext;
use chrono::{DateTime, Utc};
use probe_auth::claims::{analyze, discovery_uri};
use probe_auth::{
    decode_unverified, token_preview, ClaimReport, DecodedJwt, Severity, TokenClaims,
    TokenResponse, ROPC_SCOPES,
};
use serde_json::{json, Value};
use std::io::Read;
use tracing::debug;

/// Lead line of the recommendations when no claim issue was found
pub const CLAIMS_LOOK_CORRECT: &str =
    "Token claims look correct. If SSO still fails, check the Aura configuration:";

/// Advice printed when the claims look right but SSO still fails
pub const DEFAULT_ADVICE: [&str; 4] = [
    "Verify the Discovery URI in the Aura console matches the one below",
    "Ensure SSO is enabled for the Aura instance",
    "Check that the Client ID configured in Aura matches the app registration",
    "Try a Browser SSO login in Neo4j Browser to see the server-side error",
];

/// Acquire a token and print it.
pub async fn acquire(args: &AcquireArgs, ctx: &SuiteContext) -> Result<()> {
    let settings = ctx.entra_settings(&args.entra)?;
    let app = ctx.entra_app(&settings)?;

    let response = match args.flow {
        Flow::ClientCredentials => app.acquire_client_credentials(&settings.scope()).await?,
        Flow::Password => {
            let (username, password) = user_pair(&args.user)?;
            app.acquire_by_password(&username, &password, &ROPC_SCOPES)
                .await?
        }
    };
    let token = response.access_token()?;

    let formatter = &ctx.formatter;
    if formatter.is_json() {
        let document = acquired_json(&settings, args.flow, &response, args.raw)?;
        println!("{}", formatter.json(&document)?);
        return Ok(());
    }

    if args.raw {
        println!("{}", token);
        return Ok(());
    }

    formatter.emit(formatter.success("Token acquired"));
    formatter.emit(format!("  Flow:       {}", flow_label(args.flow)));
    if args.flow == Flow::ClientCredentials {
        formatter.emit(format!("  Scope:      {}", settings.scope()));
    }
    formatter.emit(format!(
        "  Type:       {}",
        response.token_type.as_deref().unwrap_or("Bearer")
    ));
    if let Some(expires_in) = response.expires_in {
        formatter.emit(format!("  Expires in: {}s", expires_in));
    }
    formatter.emit(format!("  Length:     {}", token.len()));
    formatter.emit(format!("  Preview:    {}", token_preview(token, 50, 0)));
    if response.id_token.is_some() {
        formatter.emit(formatter.info("An ID token was returned as well (see `token inspect`)"));
    }
    Ok(())
}

fn user_pair(user: &crate::cli::UserArgs) -> Result<(String, String)> {
    user.pair().ok_or_else(|| {
        CliError::MissingConfig(vec![
            "AZURE_USERNAME".to_string(),
            "AZURE_PASSWORD".to_string(),
        ])
    })
}

fn flow_label(flow: Flow) -> &'static str {
    match flow {
        Flow::ClientCredentials => "client credentials",
        Flow::Password => "password (ROPC)",
    }
}

/// Tokens appear as previews unless `raw` asks for them in full.
fn acquired_json(
    settings: &EntraSettings,
    flow: Flow,
    response: &TokenResponse,
    raw: bool,
) -> Result<Value> {
    let shown = |token: &str| {
        if raw {
            json!({ "token": token, "length": token.len() })
        } else {
            json!({ "preview": token_preview(token, 50, 0), "length": token.len() })
        }
    };
    Ok(json!({
        "flow": flow_label(flow),
        "tenant_id": settings.tenant_id,
        "client_id": settings.client_id,
        "token_type": response.token_type,
        "expires_in": response.expires_in,
        "access_token": shown(response.access_token()?),
        "id_token": response.id_token.as_deref().map(shown),
    }))
}

/// Decode a token without verifying it and print header and claims.
///
/// Reads the token from stdin when none is given.
pub fn decode(token: Option<String>, ctx: &SuiteContext) -> Result<()> {
    let token = match present(token) {
        Some(token) => token,
        None => read_stdin_token()?,
    };
    let decoded = decode_unverified(&token)?;
    let formatter = &ctx.formatter;

    if formatter.is_json() {
        println!("{}", formatter.json(&decoded_json(&decoded))?);
        return Ok(());
    }

    print_decoded(formatter, &decoded)?;
    let claims = TokenClaims::new(decoded.claims);
    for line in timestamp_lines(&claims, Utc::now()) {
        formatter.emit(line);
    }
    Ok(())
}

fn read_stdin_token() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    present(Some(input)).ok_or_else(|| {
        CliError::InvalidInput("No token given (argument, MCP_BEARER_TOKEN or stdin)".to_string())
    })
}

fn decoded_json(decoded: &DecodedJwt) -> Value {
    json!({ "header": decoded.header, "claims": decoded.claims })
}

fn print_decoded(formatter: &Formatter, decoded: &DecodedJwt) -> Result<()> {
    formatter.emit(formatter.header("JWT HEADER"));
    formatter.emit(formatter.json(&decoded.header)?);
    formatter.emit(formatter.header("JWT PAYLOAD (Claims)"));
    formatter.emit(formatter.json(&decoded.claims)?);
    Ok(())
}

/// Human-readable `exp`, `iat` and `nbf`, plus the remaining lifetime
pub fn timestamp_lines(claims: &TokenClaims, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, label) in [("iat", "Issued at"), ("nbf", "Not before"), ("exp", "Expires")] {
        if let Some(at) = claims.datetime(name) {
            let label = format!("{}:", label);
            lines.push(format!("{:<11} {}", label, at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
    }
    if let Some(remaining) = claims.expires_in(now) {
        if remaining.num_seconds() > 0 {
            lines.push(format!("Valid for:  {} minutes", remaining.num_minutes()));
        } else {
            lines.push("Valid for:  EXPIRED".to_string());
        }
    }
    lines
}

/// Decode a token and analyse it for Neo4j Aura SSO.
///
/// Without a token argument an ID token is acquired with the password flow,
/// which needs the full app registration and a test user.
pub async fn inspect(args: &InspectArgs, ctx: &SuiteContext) -> Result<()> {
    let registration = ctx.app_registration();
    let (token, tenant_id, client_id) = match present(args.token.clone()) {
        Some(token) => {
            let (tenant_id, client_id) = EntraSettings::resolve_identity(
                args.entra.tenant_id.clone(),
                args.entra.client_id.clone(),
                registration.as_ref(),
            )?;
            (token, tenant_id, client_id)
        }
        None => {
            let settings = args.entra.resolve_with(registration.as_ref())?;
            let (username, password) = user_pair(&args.user)?;
            debug!(%username, "Acquiring ID token for inspection");
            let response = ctx
                .entra_app(&settings)?
                .acquire_by_password(&username, &password, &ROPC_SCOPES)
                .await?;
            (
                response.id_token()?.to_string(),
                settings.tenant_id,
                settings.client_id,
            )
        }
    };

    let decoded = decode_unverified(&token)?;
    let claims = TokenClaims::new(decoded.claims.clone());
    let report = analyze(&claims, &tenant_id, &client_id);
    let formatter = &ctx.formatter;

    if formatter.is_json() {
        let document = inspection_json(&decoded, &report, &tenant_id, &client_id);
        println!("{}", formatter.json(&document)?);
        return Ok(());
    }

    formatter.emit(formatter.header("JWT Token Debug - Azure Entra ID"));
    formatter.emit(format!("Tenant ID: {}", tenant_id));
    formatter.emit(format!("Client ID: {}", client_id));
    print_decoded(formatter, &decoded)?;

    formatter.emit(formatter.header("ANALYSIS FOR NEO4J SSO"));
    for line in claim_lines(&claims, &report, Utc::now()) {
        formatter.emit(line);
    }
    formatter.emit("");
    for finding in &report.findings {
        let line = match finding.severity {
            Severity::Ok => formatter.success(&finding.message),
            Severity::Info => formatter.info(&finding.message),
            Severity::Issue => formatter.warning(&finding.message),
        };
        formatter.emit(line);
    }

    formatter.emit(formatter.header("TROUBLESHOOTING RECOMMENDATIONS"));
    for (i, line) in recommendations(&report).iter().enumerate() {
        formatter.emit(format!("{}. {}", i + 1, line));
    }

    formatter.emit(formatter.header("NEO4J AURA SSO CONFIGURATION VALUES"));
    if let Some(uri) = present(args.entra.neo4j_uri.clone()) {
        formatter.emit(format!("Neo4j URI:     {}", uri));
    }
    formatter.emit(format!("Client ID:     {}", client_id));
    formatter.emit(format!("Discovery URI: {}", discovery_uri(&tenant_id)));
    formatter.emit(formatter.info(
        "The Client Secret is not shown: create one under App registrations > Certificates & secrets",
    ));
    Ok(())
}

/// Numbered walk through the claims Neo4j SSO reads
pub fn claim_lines(claims: &TokenClaims, report: &ClaimReport, now: DateTime<Utc>) -> Vec<String> {
    let missing = "NOT FOUND";
    let list = |values: Vec<String>| {
        if values.is_empty() {
            missing.to_string()
        } else {
            values.join(", ")
        }
    };

    let mut lines = vec![
        format!("1. Token Version: {}", report.version.label()),
        format!("2. Issuer (iss): {}", claims.issuer().unwrap_or(missing)),
        format!("   Expected:     {}", report.expected_issuer),
        format!("3. Audience (aud): {}", list(claims.audiences())),
        format!("4. Subject (sub): {}", claims.subject().unwrap_or(missing)),
        format!("5. Email: {}", claims.email().unwrap_or(missing)),
        format!("6. Name: {}", claims.string("name").unwrap_or(missing)),
        format!("7. Groups: {}", list(claims.groups())),
        format!("8. Roles: {}", list(claims.roles())),
    ];
    match claims.timestamp("exp") {
        Some(exp) => lines.push(format!("9. Expiration (exp): {}", exp)),
        None => lines.push(format!("9. Expiration (exp): {}", missing)),
    }
    match claims.timestamp("iat") {
        Some(iat) => lines.push(format!("10. Issued At (iat): {}", iat)),
        None => lines.push(format!("10. Issued At (iat): {}", missing)),
    }
    lines.extend(
        timestamp_lines(claims, now)
            .into_iter()
            .map(|t| format!("    {}", t)),
    );
    lines
}

/// Hints of every issue, or the generic checklist when there are none
pub fn recommendations(report: &ClaimReport) -> Vec<String> {
    let hints: Vec<String> = report
        .issues()
        .map(|f| match &f.hint {
            Some(hint) => format!("{}: {}", f.message, hint),
            None => f.message.clone(),
        })
        .collect();
    if hints.is_empty() {
        std::iter::once(CLAIMS_LOOK_CORRECT)
            .chain(DEFAULT_ADVICE)
            .map(str::to_string)
            .collect()
    } else {
        hints
    }
}

fn inspection_json(
    decoded: &DecodedJwt,
    report: &ClaimReport,
    tenant_id: &str,
    client_id: &str,
) -> Value {
    let findings: Vec<Value> = report
        .findings
        .iter()
        .map(|f| {
            let severity = match f.severity {
                Severity::Ok => "ok",
                Severity::Info => "info",
                Severity::Issue => "issue",
            };
            json!({ "severity": severity, "message": f.message, "hint": f.hint })
        })
        .collect();

    json!({
        "header": decoded.header,
        "claims": decoded.claims,
        "version": report.version.label(),
        "expected_issuer": report.expected_issuer,
        "findings": findings,
        "recommendations": recommendations(report),
        "aura": {
            "client_id": client_id,
            "discovery_uri": discovery_uri(tenant_id),
        },
    })
}
