//! Validation suites and ad-hoc commands.

pub mod adhoc;
pub mod bearer;
pub mod entra;
pub mod http_mode;
pub mod token;
pub mod validate;
pub mod write_check;

use crate::cli::{AuthArgs, Command, EntraArgs, TokenAction};
use crate::config::{AccessConfig, AppRegistration, EntraSettings, Settings};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::results::TestResults;
use probe_auth::jwks::JwksClient;
use probe_auth::{Credentials, EntraApp};
use probe_client::McpHttpClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Name announced in `initialize`
pub const CLIENT_NAME: &str = "mcp-probe";

/// Everything a suite needs besides its own arguments
pub struct SuiteContext {
    /// Output formatter
    pub formatter: Formatter,
    /// Endpoint from `--endpoint`/`MCP_ENDPOINT`
    pub endpoint: Option<String>,
    /// Path from `--mcp-path`
    pub mcp_path: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Entra authority host
    pub authority_host: String,
    /// Where MCP_ACCESS.json is looked for
    pub access_dirs: Vec<PathBuf>,
    /// Where APP_REGISTRATION.json is looked for
    pub registration_dirs: Vec<PathBuf>,
}

impl SuiteContext {
    /// Context with the standard search paths
    pub fn new(formatter: Formatter, settings: &Settings) -> Self {
        Self {
            formatter,
            endpoint: None,
            mcp_path: None,
            timeout: Duration::from_secs(settings.timeout_secs),
            authority_host: settings.authority_host.clone(),
            access_dirs: AccessConfig::search_dirs(),
            registration_dirs: AppRegistration::search_dirs(),
        }
    }

    /// Client for `endpoint`; `--mcp-path` wins over `mcp_path`
    pub fn client(&self, endpoint: &str, mcp_path: Option<&str>) -> Result<McpHttpClient> {
        let path = self
            .mcp_path
            .as_deref()
            .or(mcp_path)
            .unwrap_or(probe_client::DEFAULT_MCP_PATH);
        Ok(McpHttpClient::new(endpoint, path, self.timeout)?)
    }

    /// MCP_ACCESS.json from the search path, if any
    pub fn access_config(&self) -> Result<Option<AccessConfig>> {
        AccessConfig::discover_in(&self.access_dirs)
    }

    /// APP_REGISTRATION.json from the search path, if any
    pub fn app_registration(&self) -> Option<AppRegistration> {
        AppRegistration::discover_in(&self.registration_dirs)
    }

    /// Entra settings from arguments plus the app registration fallback
    pub fn entra_settings(&self, args: &EntraArgs) -> Result<EntraSettings> {
        args.resolve_with(self.app_registration().as_ref())
    }

    /// Token client for `settings`
    pub fn entra_app(&self, settings: &EntraSettings) -> Result<EntraApp> {
        Ok(EntraApp::new(
            &settings.tenant_id,
            &settings.client_id,
            &settings.client_secret,
        )?
        .with_authority_host(&self.authority_host))
    }

    /// Key discovery client
    pub fn jwks_client(&self) -> Result<JwksClient> {
        Ok(JwksClient::new()?.with_authority_host(&self.authority_host))
    }

    /// Acquire an M2M access token
    pub async fn acquire_m2m_token(&self, settings: &EntraSettings) -> Result<String> {
        let response = self
            .entra_app(settings)?
            .acquire_client_credentials(&settings.scope())
            .await?;
        Ok(response.access_token()?.to_string())
    }

    /// Endpoint and MCP path from the flag, falling back to MCP_ACCESS.json
    pub fn endpoint_or_access(&self) -> Result<(String, Option<String>)> {
        if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            return Ok((endpoint.to_string(), None));
        }
        match self.access_config()? {
            Some(access) => match access.endpoint() {
                Some(endpoint) => Ok((endpoint.to_string(), Some(access.mcp_path.clone()))),
                None => Err(CliError::Config(
                    "No endpoint found in MCP_ACCESS.json".to_string(),
                )),
            },
            None => Err(CliError::Config(
                "MCP_ENDPOINT not set and MCP_ACCESS.json not found".to_string(),
            )),
        }
    }

    /// Credentials for ad-hoc calls.
    ///
    /// Order: bearer token, Entra client credentials, API key (argument or
    /// MCP_ACCESS.json), Neo4j basic auth.
    pub async fn credentials(&self, auth: &AuthArgs) -> Result<Credentials> {
        if let Some(token) = crate::config::present(auth.bearer_token.clone()) {
            debug!("Using bearer token from arguments");
            return Ok(Credentials::bearer(token));
        }
        if auth.entra.has_secret() {
            let settings = self.entra_settings(&auth.entra)?;
            debug!("Acquiring token with client credentials");
            return Ok(Credentials::bearer(self.acquire_m2m_token(&settings).await?));
        }
        let access = self
            .access_config()?
            .unwrap_or_default()
            .with_api_key(auth.api_key.clone());
        if let Some(key) = access.api_key() {
            debug!("Using API key");
            return Ok(Credentials::bearer(key));
        }
        if let Some((username, password)) = auth.basic.pair() {
            debug!("Using basic auth");
            return Ok(Credentials::basic(username, password));
        }
        Err(CliError::Config(
            "No authentication configured. Set one of:\n  \
             - MCP_BEARER_TOKEN: Direct bearer token\n  \
             - AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET: Azure Entra ID credentials\n  \
             - MCP_API_KEY: Deployment API key\n  \
             - NEO4J_USERNAME, NEO4J_PASSWORD: Basic auth"
                .to_string(),
        ))
    }
}

/// Run a command other than the menu.
///
/// Suites return their results; ad-hoc commands return `None`.
pub async fn execute(command: Command, ctx: &SuiteContext) -> Result<Option<TestResults>> {
    match command {
        Command::HttpMode(args) => http_mode::run(&args, ctx).await.map(Some),
        Command::Bearer(args) => bearer::run(&args, ctx).await.map(Some),
        Command::Validate(args) => validate::run(&args, ctx).await.map(Some),
        Command::WriteCheck(args) => write_check::run(&args, ctx).await.map(Some),
        Command::EntraValidate(args) => entra::run(&args, ctx).await.map(Some),
        Command::Tools(args) => adhoc::tools(&args, ctx).await.map(|_| None),
        Command::Schema(args) => adhoc::schema(&args, ctx).await.map(|_| None),
        Command::Cypher(args) => adhoc::cypher(&args, ctx).await.map(|_| None),
        Command::Token(args) => match args.action {
            TokenAction::Acquire(args) => token::acquire(&args, ctx).await.map(|_| None),
            TokenAction::Decode { token } => token::decode(token, ctx).map(|_| None),
            TokenAction::Inspect(args) => token::inspect(&args, ctx).await.map(|_| None),
        },
        Command::Menu(_) => Err(CliError::InvalidInput(
            "The menu cannot be started from inside the menu".to_string(),
        )),
    }
}
