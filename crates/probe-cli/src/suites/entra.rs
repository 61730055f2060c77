//! Entra ID M2M validation.
//!
//! Acquires a client-credentials token and verifies it the way a resource
//! server would: discovery document, key set, `kid` lookup, then signature
//! and claim validation. Passing means the Entra side is configured correctly.

use crate::cli::EntraArgs;
use crate::config::{present, EntraSettings};
use crate::error::Result;
use crate::results::{Recorder, TestResults};
use crate::suites::token::timestamp_lines;
use crate::suites::SuiteContext;
use chrono::Utc;
use probe_auth::claims::valid_issuers;
use probe_auth::jwks::{key_id, select_key, TokenVerifier};
use probe_auth::{decode_unverified, mask_identifier, token_preview, TokenClaims};

const ACQUIRE: &str = "Token acquisition";
const DISCOVERY: &str = "JWKS discovery";
const KEY_SET: &str = "Key set fetch";
const KEY_LOOKUP: &str = "Key lookup (kid)";
const VERIFY: &str = "Signature/claims verification";

const LATER_STEPS: [&str; 4] = [DISCOVERY, KEY_SET, KEY_LOOKUP, VERIFY];

/// Run the suite.
pub async fn run(args: &EntraArgs, ctx: &SuiteContext) -> Result<TestResults> {
    let settings = ctx.entra_settings(args)?;
    if let Some(uri) = present(args.neo4j_uri.clone()) {
        ctx.formatter
            .emit(ctx.formatter.info(&format!("Neo4j URI: {}", uri)));
    }
    let verifier = verifier(&settings);
    validate(&settings, &verifier, ctx).await
}

/// Verifier for tokens issued to `settings`' app registration.
///
/// The audience is the Application ID URI unless a custom one is configured.
pub fn verifier(settings: &EntraSettings) -> TokenVerifier {
    match settings.audience.as_deref() {
        Some(audience) => TokenVerifier::new(
            audience.trim_end_matches('/'),
            valid_issuers(&settings.tenant_id),
        ),
        None => TokenVerifier::for_m2m(&settings.tenant_id, &settings.client_id),
    }
}

/// Acquire a token for `settings` and check it with `verifier`.
pub async fn validate(
    settings: &EntraSettings,
    verifier: &TokenVerifier,
    ctx: &SuiteContext,
) -> Result<TestResults> {
    let mut rec = Recorder::new("entra-validate", &ctx.formatter);
    rec.header("Azure Entra ID M2M Token Validation");
    rec.info(format!("Tenant ID: {}", mask_identifier(&settings.tenant_id)));
    rec.info(format!("Client ID: {}", mask_identifier(&settings.client_id)));
    rec.info(format!("Scope:     {}", settings.scope()));

    rec.header("STEP 1: Token Acquisition");
    let token = match ctx.acquire_m2m_token(settings).await {
        Ok(token) => token,
        Err(e) => {
            rec.fail(ACQUIRE, e.to_string());
            if let Some(diagnosis) = e.diagnosis() {
                rec.note(diagnosis);
            }
            for step in LATER_STEPS {
                rec.skip(step, "no token");
            }
            return Ok(conclude(rec));
        }
    };
    rec.pass(
        ACQUIRE,
        format!("{} ({} characters)", token_preview(&token, 50, 0), token.len()),
    );
    print_claims(&rec, &token);

    rec.header("STEP 2: Cryptographic Validation");
    let jwks = ctx.jwks_client()?;

    let jwks_uri = match jwks.discover_jwks_uri(&settings.tenant_id).await {
        Ok(uri) => {
            rec.pass(DISCOVERY, uri.clone());
            uri
        }
        Err(e) => return Ok(abort(rec, DISCOVERY, e.to_string())),
    };

    let key_set = match jwks.fetch_key_set(&jwks_uri).await {
        Ok(set) => {
            rec.pass(KEY_SET, format!("{} keys published", set.keys.len()));
            set
        }
        Err(e) => return Ok(abort(rec, KEY_SET, e.to_string())),
    };

    let key = match key_id(&token).and_then(|kid| {
        let jwk = select_key(&key_set, &kid)?;
        Ok((kid, TokenVerifier::decoding_key(jwk)?))
    }) {
        Ok((kid, key)) => {
            rec.pass(KEY_LOOKUP, format!("kid={}", kid));
            key
        }
        Err(e) => return Ok(abort(rec, KEY_LOOKUP, e.to_string())),
    };

    match verifier.verify(&token, &key) {
        Ok(claims) => rec.pass(
            VERIFY,
            format!(
                "Signature valid, not expired, iss={}, aud={}",
                claims["iss"].as_str().unwrap_or("?"),
                verifier.audience()
            ),
        ),
        Err(e) => rec.fail(VERIFY, e.to_string()),
    }

    Ok(conclude(rec))
}

fn print_claims(rec: &Recorder, token: &str) {
    let Ok(decoded) = decode_unverified(token) else {
        return;
    };
    let claims = TokenClaims::new(decoded.claims);
    rec.info("Token claims:");
    rec.detail(format!("aud: {}", claims.audiences().join(", ")));
    rec.detail(format!("iss: {}", claims.issuer().unwrap_or("N/A")));
    for name in ["appid", "azp", "tid", "ver"] {
        if let Some(value) = claims.string(name) {
            rec.detail(format!("{}: {}", name, value));
        }
    }
    let roles = claims.roles();
    if !roles.is_empty() {
        rec.detail(format!("roles: {}", roles.join(", ")));
    }
    for line in timestamp_lines(&claims, Utc::now()) {
        rec.detail(line);
    }
}

fn abort(mut rec: Recorder, step: &str, detail: String) -> TestResults {
    rec.fail(step, detail);
    let position = LATER_STEPS.iter().position(|s| *s == step).unwrap_or(0);
    for later in &LATER_STEPS[position + 1..] {
        rec.skip(later, format!("{} failed", step));
    }
    conclude(rec)
}

fn conclude(rec: Recorder) -> TestResults {
    if rec.results().success() {
        rec.header("SUCCESS - Entra M2M Setup is Correct");
        rec.info("Your Azure Entra ID M2M configuration is valid:");
        rec.detail("- Token acquired successfully");
        rec.detail("- Signature verified with Azure's public key");
        rec.detail("- Issuer and audience claims are correct");
        rec.detail("- Token has not expired");
        rec.info("If Neo4j Aura still rejects this token, the issue is with Aura's SSO support for M2M tokens, not the Entra setup.");
    } else {
        rec.header("VALIDATION FAILED");
        rec.note("Fix the issues above before testing Neo4j Aura SSO.");
    }
    rec.finish()
}
