//! End-to-end tests for the suites.
//!
//! One axum app plays both sides: the MCP server on `/mcp` and the Entra
//! authority (token endpoint, discovery document, key set). Tokens it issues
//! are HS256 JWTs signed with an `oct` key it also publishes.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use clap::Parser;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use probe_auth::Credentials;
use probe_cli::config::{EntraSettings, OutputFormat, ACCESS_FILE};
use probe_cli::results::Outcome;
use probe_cli::suites::{self, entra};
use probe_cli::{menu, Cli, CliError, Command, Formatter, Settings, SuiteContext, TestResults};
use probe_client::ClientError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

const TENANT: &str = "tenant-1";
const CLIENT: &str = "client-1";
const SECRET: &str = "right-secret";
const GOOD_TOKEN: &str = "good-token";
const READ_WRITE_TOKEN: &str = "rw-token";
/// Lists tools, but every tool call answers 401
const LIST_ONLY_TOKEN: &str = "list-only-token";
/// `tools/list` returns nothing
const EMPTY_TOOLS_TOKEN: &str = "empty-tools-token";
/// `get-schema` fails with a JSON-RPC error, reads still work
const NO_SCHEMA_TOKEN: &str = "no-schema-token";
/// `write-cypher` answers with `isError`
const TOOL_GUARDED_TOKEN: &str = "tool-guarded-token";
/// `write-cypher` answers HTTP 403
const FORBIDDEN_WRITE_TOKEN: &str = "forbidden-write-token";

const SIGNING_KEY: &[u8] = b"secretkey123";
const SIGNING_KEY_B64: &str = "c2VjcmV0a2V5MTIz";

#[derive(Clone)]
struct FakeServer {
    base_url: String,
    jwt: String,
}

fn mint_jwt() -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some("k1".to_string());
    let claims = json!({
        "aud": format!("api://{}", CLIENT),
        "iss": format!("https://login.microsoftonline.com/{}/v2.0", TENANT),
        "exp": chrono::Utc::now().timestamp() + 3600,
        "iat": chrono::Utc::now().timestamp(),
        "ver": "2.0",
        "appid": CLIENT,
        "roles": ["Mcp.Read"],
        "email": "probe@example.com"
    });
    encode(&header, &claims, &EncodingKey::from_secret(SIGNING_KEY)).unwrap()
}

fn rpc_result(id: &Value, result: Value) -> Response {
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response()
}

fn rpc_error(id: &Value, code: i64, message: &str) -> Response {
    Json(json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}}))
        .into_response()
}

fn text(text: &str) -> Value {
    json!({"content": [{"type": "text", "text": text}]})
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, r#"Bearer realm="mcp", Basic realm="mcp""#)],
        "Unauthorized",
    )
        .into_response()
}

async fn mcp(
    State(server): State<FakeServer>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bearer = auth.strip_prefix("Bearer ").unwrap_or_default();
    let accepted = [
        GOOD_TOKEN,
        READ_WRITE_TOKEN,
        LIST_ONLY_TOKEN,
        EMPTY_TOOLS_TOKEN,
        NO_SCHEMA_TOKEN,
        TOOL_GUARDED_TOKEN,
        FORBIDDEN_WRITE_TOKEN,
        server.jwt.as_str(),
    ]
    .contains(&bearer)
        || auth == Credentials::basic("neo4j", "password").authorization_header();
    if !accepted {
        return unauthorized();
    }
    let read_write = bearer == READ_WRITE_TOKEN;

    let id = &request["id"];
    match request["method"].as_str().unwrap_or_default() {
        "initialize" => rpc_result(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": {"name": "fake-neo4j-mcp", "version": "0.0.1"},
                "capabilities": {"tools": {}}
            }),
        ),
        "tools/list" if bearer == EMPTY_TOOLS_TOKEN => rpc_result(id, json!({"tools": []})),
        "tools/list" => {
            let mut tools = vec![
                json!({"name": "get-schema", "description": "Graph schema"}),
                json!({"name": "read-cypher", "description": "Read-only Cypher"}),
            ];
            if read_write {
                tools.push(json!({"name": "write-cypher", "description": "Write Cypher"}));
            }
            rpc_result(id, json!({ "tools": tools }))
        }
        "tools/call" if bearer == LIST_ONLY_TOKEN => unauthorized(),
        "tools/call" => match request["params"]["name"].as_str().unwrap_or_default() {
            "get-schema" if bearer == NO_SCHEMA_TOKEN => {
                rpc_error(id, -32603, "Neo4j.ClientError.Security.Unauthorized")
            }
            "get-schema" => rpc_result(id, text("Person\n  name: STRING\n\nKNOWS")),
            "read-cypher" => rpc_result(id, text(r#"[{"value": 1}]"#)),
            "write-cypher" if read_write => rpc_result(id, text(r#"[{"probe": 1}]"#)),
            "write-cypher" if bearer == TOOL_GUARDED_TOKEN => rpc_result(
                id,
                json!({
                    "content": [{"type": "text", "text": "write queries are disabled"}],
                    "isError": true
                }),
            ),
            "write-cypher" if bearer == FORBIDDEN_WRITE_TOKEN => {
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            other => rpc_error(id, -32602, &format!("unknown tool: {}", other)),
        },
        _ => rpc_error(id, -32601, "Method not found"),
    }
}

async fn token(
    State(server): State<FakeServer>,
    Path(tenant): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if tenant != TENANT || form.get("client_secret").map(String::as_str) != Some(SECRET) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })),
        )
            .into_response();
    }
    Json(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": server.jwt,
        "id_token": server.jwt
    }))
    .into_response()
}

async fn discovery(State(server): State<FakeServer>) -> Json<Value> {
    Json(json!({ "jwks_uri": format!("{}/discovery/keys", server.base_url) }))
}

async fn keys() -> Json<Value> {
    Json(json!({"keys": [{"kty": "oct", "kid": "k1", "k": SIGNING_KEY_B64}]}))
}

async fn start_fake_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let state = FakeServer {
        base_url: base_url.clone(),
        jwt: mint_jwt(),
    };

    let app = Router::new()
        .route("/mcp", post(mcp))
        .route("/:tenant/oauth2/v2.0/token", post(token))
        .route(
            "/:tenant/v2.0/.well-known/openid-configuration",
            get(discovery),
        )
        .route("/discovery/keys", get(keys))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}

fn context(base: &str, dir: &TempDir) -> SuiteContext {
    let mut ctx = SuiteContext::new(
        Formatter::new(OutputFormat::Json, false),
        &Settings::default(),
    );
    ctx.endpoint = Some(base.to_string());
    ctx.timeout = Duration::from_secs(5);
    ctx.authority_host = base.to_string();
    ctx.access_dirs = vec![dir.path().to_path_buf()];
    ctx.registration_dirs = vec![dir.path().to_path_buf()];
    ctx
}

fn command(args: &[&str]) -> Command {
    let argv = std::iter::once("mcp-probe").chain(args.iter().copied());
    Cli::try_parse_from(argv).unwrap().command.unwrap()
}

async fn run_suite(args: &[&str], ctx: &SuiteContext) -> TestResults {
    suites::execute(command(args), ctx).await.unwrap().unwrap()
}

fn outcome(results: &TestResults, name: &str) -> Outcome {
    results
        .checks
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no check named {}", name))
        .outcome
}

const ENTRA_FLAGS: [&str; 6] = [
    "--azure-tenant-id",
    TENANT,
    "--azure-client-id",
    CLIENT,
    "--azure-client-secret",
    SECRET,
];

#[tokio::test]
async fn test_http_mode_with_bearer_token() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(&["http-mode", "--bearer-token", GOOD_TOKEN], &ctx).await;

    assert_eq!(results.failed, 0, "{:?}", results.failures());
    assert_eq!(results.total(), 7);
    assert_eq!(outcome(&results, "1. Health check"), Outcome::Pass);
    assert_eq!(outcome(&results, "2. Request without authentication"), Outcome::Pass);
    assert_eq!(outcome(&results, "4. Basic authentication"), Outcome::Skip);
    assert_eq!(outcome(&results, "7. MCP get-schema"), Outcome::Pass);
}

#[tokio::test]
async fn test_http_mode_rejected_credentials_are_warnings() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &["http-mode", "--username", "neo4j", "--password", "wrong"],
        &ctx,
    )
    .await;

    assert!(results.success());
    assert_eq!(outcome(&results, "3. Bearer token authentication"), Outcome::Skip);
    assert_eq!(outcome(&results, "4. Basic authentication"), Outcome::Warn);
    assert_eq!(outcome(&results, "5. MCP initialize"), Outcome::Warn);
}

#[tokio::test]
async fn test_http_mode_http_only() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &["http-mode", "--bearer-token", GOOD_TOKEN, "--http-only"],
        &ctx,
    )
    .await;

    assert_eq!(results.passed, 3);
    assert_eq!(results.skipped, 4);
    assert_eq!(outcome(&results, "6. MCP list tools"), Outcome::Skip);
}

#[tokio::test]
async fn test_http_mode_server_down() {
    let dir = TempDir::new().unwrap();
    let ctx = context("http://127.0.0.1:1", &dir);

    let results = run_suite(&["http-mode"], &ctx).await;

    assert_eq!(results.failed, 1);
    assert_eq!(results.total(), 1);
    assert_eq!(results.exit_code(), 1);
}

#[tokio::test]
async fn test_http_mode_acquires_entra_token() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let mut args = vec!["http-mode"];
    args.extend(ENTRA_FLAGS);
    let results = run_suite(&args, &ctx).await;

    assert_eq!(results.failed, 0, "{:?}", results.failures());
    assert_eq!(outcome(&results, "3. Bearer token authentication"), Outcome::Pass);
}

#[tokio::test]
async fn test_http_mode_token_acquisition_failure_is_fatal() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let err = suites::execute(
        command(&[
            "http-mode",
            "--azure-tenant-id",
            TENANT,
            "--azure-client-id",
            CLIENT,
            "--azure-client-secret",
            "wrong-secret",
        ]),
        &ctx,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CliError::Auth(_)));
    assert!(err.diagnosis().unwrap().contains("client secret"));
}

#[tokio::test]
async fn test_bearer_suite_passes() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(&["bearer", "--bearer-token", GOOD_TOKEN], &ctx).await;

    assert_eq!(results.failed, 0, "{:?}", results.failures());
    assert_eq!(results.passed, 5);
}

#[tokio::test]
async fn test_bearer_suite_stops_on_critical_failure() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(&["bearer", "--bearer-token", "expired"], &ctx).await;

    assert_eq!(results.failed, 1);
    assert_eq!(results.skipped, 4);
    assert_eq!(outcome(&results, "Initialize"), Outcome::Fail);
    assert_eq!(outcome(&results, "Node count"), Outcome::Skip);
}

#[tokio::test]
async fn test_bearer_schema_failure_is_a_warning() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(&["bearer", "--bearer-token", NO_SCHEMA_TOKEN], &ctx).await;

    assert!(results.success(), "{:?}", results.failures());
    assert_eq!(outcome(&results, "Get schema"), Outcome::Warn);
    assert_eq!(outcome(&results, "Read cypher"), Outcome::Pass);
    assert_eq!(outcome(&results, "Node count"), Outcome::Pass);
}

#[tokio::test]
async fn test_bearer_without_credentials_lists_both_options() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let err = suites::execute(command(&["bearer"]), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Config(_)));
    let message = err.to_string();
    assert!(message.contains("MCP_BEARER_TOKEN"));
    assert!(message.contains("AZURE_CLIENT_SECRET"));
}

#[tokio::test]
async fn test_validate_from_access_file() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(ACCESS_FILE),
        json!({"endpoint": base, "mcp_path": "/mcp", "api_key": GOOD_TOKEN}).to_string(),
    )
    .unwrap();
    let mut ctx = context(&base, &dir);
    ctx.endpoint = None;

    let results = run_suite(&["validate"], &ctx).await;

    assert_eq!(results.failed, 0, "{:?}", results.failures());
    assert_eq!(results.passed, 5);
    assert_eq!(outcome(&results, "Auth rejection (invalid key)"), Outcome::Pass);
}

#[tokio::test]
async fn test_validate_placeholder_key_is_an_error() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(ACCESS_FILE),
        json!({"endpoint": base, "api_key": "YOUR_API_KEY"}).to_string(),
    )
    .unwrap();
    let ctx = context(&base, &dir);

    let err = suites::execute(command(&["validate"]), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}

fn write_access_file(dir: &TempDir, endpoint: &str, api_key: &str) {
    std::fs::write(
        dir.path().join(ACCESS_FILE),
        json!({"endpoint": endpoint, "api_key": api_key}).to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_validate_tool_401_fails() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    write_access_file(&dir, &base, LIST_ONLY_TOKEN);
    let ctx = context(&base, &dir);

    let results = run_suite(&["validate"], &ctx).await;

    assert_eq!(outcome(&results, "Tools list"), Outcome::Pass);
    assert_eq!(outcome(&results, "Get schema"), Outcome::Fail);
    assert_eq!(outcome(&results, "Read cypher"), Outcome::Fail);
    assert_eq!(results.exit_code(), 1);
}

#[tokio::test]
async fn test_validate_other_tool_errors_are_warnings() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    write_access_file(&dir, &base, NO_SCHEMA_TOKEN);
    let ctx = context(&base, &dir);

    let results = run_suite(&["validate"], &ctx).await;

    assert!(results.success(), "{:?}", results.failures());
    assert_eq!(outcome(&results, "Get schema"), Outcome::Warn);
    assert_eq!(outcome(&results, "Read cypher"), Outcome::Pass);
}

#[tokio::test]
async fn test_validate_empty_tool_list_is_a_warning() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    write_access_file(&dir, &base, EMPTY_TOOLS_TOKEN);
    let ctx = context(&base, &dir);

    let results = run_suite(&["validate"], &ctx).await;

    assert_eq!(outcome(&results, "Tools list"), Outcome::Warn);
    assert!(results.success(), "{:?}", results.failures());
}

#[tokio::test]
async fn test_validate_prefers_access_file_endpoint() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    write_access_file(&dir, &base, GOOD_TOKEN);
    let ctx = context("http://127.0.0.1:1", &dir);

    let results = run_suite(&["validate"], &ctx).await;

    assert_eq!(results.failed, 0, "{:?}", results.failures());
    assert_eq!(results.passed, 5);
}

#[tokio::test]
async fn test_write_check_tool_error_counts_as_rejection() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &["write-check", "--bearer-token", TOOL_GUARDED_TOKEN, "--probe-write"],
        &ctx,
    )
    .await;

    assert!(results.success(), "{:?}", results.failures());
    assert_eq!(outcome(&results, "write-cypher rejected"), Outcome::Pass);
    let check = results
        .checks
        .iter()
        .find(|c| c.name == "write-cypher rejected")
        .unwrap();
    assert!(check.detail.contains("write queries are disabled"));
}

#[tokio::test]
async fn test_write_check_forbidden_counts_as_rejection() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &["write-check", "--bearer-token", FORBIDDEN_WRITE_TOKEN, "--probe-write"],
        &ctx,
    )
    .await;

    assert!(results.success(), "{:?}", results.failures());
    assert_eq!(outcome(&results, "write-cypher rejected"), Outcome::Pass);
}

#[tokio::test]
async fn test_write_check_read_only_server() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &["write-check", "--bearer-token", GOOD_TOKEN, "--probe-write"],
        &ctx,
    )
    .await;

    assert!(results.success(), "{:?}", results.failures());
    assert_eq!(outcome(&results, "write-cypher rejected"), Outcome::Pass);
}

#[tokio::test]
async fn test_write_check_flags_writable_server() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &["write-check", "--bearer-token", READ_WRITE_TOKEN, "--probe-write"],
        &ctx,
    )
    .await;

    assert_eq!(results.failed, 2);
    assert_eq!(outcome(&results, "write-cypher not advertised"), Outcome::Fail);
    assert_eq!(outcome(&results, "write-cypher rejected"), Outcome::Fail);
}

#[tokio::test]
async fn test_adhoc_commands() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let none = suites::execute(command(&["tools", "--bearer-token", GOOD_TOKEN]), &ctx)
        .await
        .unwrap();
    assert!(none.is_none());

    suites::execute(
        command(&["cypher", "RETURN 1 as value", "--bearer-token", GOOD_TOKEN]),
        &ctx,
    )
    .await
    .unwrap();

    let err = suites::execute(
        command(&["cypher", "CREATE (n)", "--write", "--bearer-token", GOOD_TOKEN]),
        &ctx,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Client(ClientError::Rpc { code: -32602, .. })));
}

#[tokio::test]
async fn test_token_decode_and_inspect() {
    let dir = TempDir::new().unwrap();
    let ctx = context("http://127.0.0.1:1", &dir);
    let jwt = mint_jwt();

    suites::execute(command(&["token", "decode", jwt.as_str()]), &ctx)
        .await
        .unwrap();
    suites::execute(
        command(&[
            "token",
            "inspect",
            jwt.as_str(),
            "--azure-tenant-id",
            TENANT,
            "--azure-client-id",
            CLIENT,
        ]),
        &ctx,
    )
    .await
    .unwrap();

    let err = suites::execute(command(&["token", "decode", "not-a-jwt"]), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Auth(_)));
}

#[tokio::test]
async fn test_token_inspect_acquires_id_token() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let mut args = vec!["token", "inspect"];
    args.extend(ENTRA_FLAGS);
    args.extend(["--azure-username", "probe@example.com", "--azure-password", "pw"]);
    suites::execute(command(&args), &ctx).await.unwrap();

    let mut args = vec!["token", "inspect"];
    args.extend(ENTRA_FLAGS);
    let err = suites::execute(command(&args), &ctx).await.unwrap_err();
    assert!(matches!(err, CliError::MissingConfig(_)));

    let mut args = vec!["token", "inspect", "--azure-client-secret", "wrong-secret"];
    args.extend(&ENTRA_FLAGS[..4]);
    args.extend(["--azure-username", "probe@example.com", "--azure-password", "pw"]);
    let err = suites::execute(command(&args), &ctx).await.unwrap_err();
    assert!(matches!(err, CliError::Auth(_)));
}

#[tokio::test]
async fn test_token_acquire() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let mut args = vec!["token", "acquire"];
    args.extend(ENTRA_FLAGS);
    suites::execute(command(&args), &ctx).await.unwrap();

    let mut args = vec!["token", "acquire", "--flow", "password"];
    args.extend(ENTRA_FLAGS);
    args.extend(["--azure-username", "probe@example.com", "--azure-password", "pw"]);
    suites::execute(command(&args), &ctx).await.unwrap();
}

#[tokio::test]
async fn test_entra_validation_succeeds() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);
    let settings = EntraSettings {
        tenant_id: TENANT.to_string(),
        client_id: CLIENT.to_string(),
        client_secret: SECRET.to_string(),
        audience: None,
    };
    let verifier = entra::verifier(&settings).with_algorithms(vec![Algorithm::HS256]);

    let results = entra::validate(&settings, &verifier, &ctx).await.unwrap();

    assert!(results.success(), "{:?}", results.failures());
    assert_eq!(results.passed, 5);
    assert_eq!(outcome(&results, "Key lookup (kid)"), Outcome::Pass);
}

#[tokio::test]
async fn test_entra_validation_requires_rs256() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let mut args = vec!["entra-validate"];
    args.extend(ENTRA_FLAGS);
    let results = run_suite(&args, &ctx).await;

    assert_eq!(results.failures(), vec!["Signature/claims verification"]);
    assert_eq!(results.exit_code(), 1);
}

#[tokio::test]
async fn test_entra_validation_bad_secret() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = run_suite(
        &[
            "entra-validate",
            "--azure-tenant-id",
            TENANT,
            "--azure-client-id",
            CLIENT,
            "--azure-client-secret",
            "wrong-secret",
        ],
        &ctx,
    )
    .await;

    assert_eq!(outcome(&results, "Token acquisition"), Outcome::Fail);
    assert_eq!(results.skipped, 4);
}

#[tokio::test]
async fn test_menu_choice_runs_one_suite() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let args = probe_cli::cli::MenuArgs {
        choice: Some("1".to_string()),
    };
    let results = menu::run(&args, &ctx).await.unwrap().unwrap();

    assert_eq!(results.suite, "http-mode");
    assert_eq!(outcome(&results, "1. Health check"), Outcome::Pass);
}

#[tokio::test]
async fn test_menu_all_aggregates_suites() {
    let base = start_fake_server().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&base, &dir);

    let results = menu::run_all(&ctx).await.unwrap();

    assert_eq!(results.suite, "all");
    assert_eq!(outcome(&results, "http-mode: 1. Health check"), Outcome::Pass);
    assert!(results.total() > 1);
}
