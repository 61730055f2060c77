//! CLI command definitions and argument parsing.

use crate::config::{present, present_secret, AppRegistration, EntraSettings};
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// mcp-probe - Validate a Neo4j MCP server and its Entra ID authentication.
#[derive(Debug, Parser)]
#[command(name = "mcp-probe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Server base URL (e.g., http://localhost:8080)
    #[arg(long, env = "MCP_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// MCP path below the endpoint [default: /mcp]
    #[arg(long, global = true)]
    pub mcp_path: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Extra .env file loaded over ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate HTTP transport and per-request authentication
    HttpMode(HttpModeArgs),

    /// Exercise the server with a bearer token
    Bearer(BearerArgs),

    /// Validate a deployment described by MCP_ACCESS.json
    Validate(ValidateArgs),

    /// Verify that the server is read-only
    WriteCheck(WriteCheckArgs),

    /// List the advertised tools
    Tools(AuthArgs),

    /// Print the database schema
    Schema(AuthArgs),

    /// Run a Cypher query through the MCP server
    Cypher(CypherArgs),

    /// Acquire, decode and inspect tokens
    Token(TokenArgs),

    /// Validate the Entra M2M setup independently of Neo4j
    EntraValidate(EntraArgs),

    /// Interactive menu over the suites
    Menu(MenuArgs),
}

/// Entra app registration values.
///
/// Tenant and client fall back to APP_REGISTRATION.json.
#[derive(Debug, Clone, Default, Args)]
pub struct EntraArgs {
    /// Directory (tenant) id
    #[arg(long = "azure-tenant-id", env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Application (client) id
    #[arg(long = "azure-client-id", env = "AZURE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(long = "azure-client-secret", env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Custom audience [default: api://{client_id}]
    #[arg(long = "azure-audience", visible_alias = "audience", env = "AZURE_AUDIENCE")]
    pub audience: Option<String>,

    /// Aura instance the tokens are meant for (displayed only)
    #[arg(long, env = "NEO4J_URI")]
    pub neo4j_uri: Option<String>,
}

impl EntraArgs {
    /// Whether a usable client secret was supplied
    pub fn has_secret(&self) -> bool {
        present_secret(self.client_secret.clone()).is_some()
    }

    /// Resolve against `registration`, reporting every missing value.
    pub fn resolve_with(&self, registration: Option<&AppRegistration>) -> Result<EntraSettings> {
        EntraSettings::resolve(
            self.tenant_id.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
            self.audience.clone(),
            registration,
        )
    }
}

/// Entra user for the password flow.
#[derive(Debug, Clone, Default, Args)]
pub struct UserArgs {
    /// User principal name
    #[arg(long = "azure-username", env = "AZURE_USERNAME")]
    pub username: Option<String>,

    /// User password
    #[arg(long = "azure-password", env = "AZURE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl UserArgs {
    /// Both values, when present
    pub fn pair(&self) -> Option<(String, String)> {
        Some((present(self.username.clone())?, present(self.password.clone())?))
    }
}

/// Neo4j basic-auth credentials.
#[derive(Debug, Clone, Default, Args)]
pub struct BasicArgs {
    /// Neo4j username
    #[arg(long, env = "NEO4J_USERNAME")]
    pub username: Option<String>,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl BasicArgs {
    /// Both values, when present
    pub fn pair(&self) -> Option<(String, String)> {
        Some((present(self.username.clone())?, present(self.password.clone())?))
    }
}

/// Arguments for the http-mode suite.
#[derive(Debug, Clone, Default, Args)]
pub struct HttpModeArgs {
    /// Bearer token (JWT) sent as-is
    #[arg(long, env = "MCP_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    #[command(flatten)]
    pub entra: EntraArgs,

    #[command(flatten)]
    pub basic: BasicArgs,

    /// Only check the HTTP transport, skip Neo4j-backed checks
    #[arg(long)]
    pub http_only: bool,
}

/// Arguments for the bearer suite.
#[derive(Debug, Clone, Default, Args)]
pub struct BearerArgs {
    /// Bearer token (JWT) sent as-is
    #[arg(long, env = "MCP_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    #[command(flatten)]
    pub entra: EntraArgs,
}

/// Arguments for the deployment validation suite.
#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    /// API key, overriding the one in MCP_ACCESS.json
    #[arg(long, env = "MCP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Explicit MCP_ACCESS.json path
    #[arg(long)]
    pub access_file: Option<PathBuf>,
}

/// Credentials for ad-hoc calls.
///
/// Tried in order: bearer token, Entra client credentials, API key, basic.
#[derive(Debug, Clone, Default, Args)]
pub struct AuthArgs {
    /// Bearer token (JWT) sent as-is
    #[arg(long, env = "MCP_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// API key, overriding the one in MCP_ACCESS.json
    #[arg(long, env = "MCP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(flatten)]
    pub entra: EntraArgs,

    #[command(flatten)]
    pub basic: BasicArgs,
}

/// Arguments for the write-check suite.
#[derive(Debug, Clone, Default, Args)]
pub struct WriteCheckArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Also call write-cypher with a side-effect-free query and expect rejection
    #[arg(long)]
    pub probe_write: bool,
}

/// Arguments for the cypher command.
#[derive(Debug, Clone, Args)]
pub struct CypherArgs {
    /// Cypher query
    pub query: String,

    /// Use write-cypher instead of read-cypher
    #[arg(long)]
    pub write: bool,

    /// Query parameters as a JSON object
    #[arg(long)]
    pub params: Option<String>,

    #[command(flatten)]
    pub auth: AuthArgs,
}

/// Arguments for token commands.
#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub action: TokenAction,
}

/// Token actions.
#[derive(Debug, Subcommand)]
pub enum TokenAction {
    /// Acquire a token from Entra ID
    Acquire(AcquireArgs),

    /// Print a token's header and claims without verifying it
    Decode {
        /// Token [default: MCP_BEARER_TOKEN, then stdin]
        #[arg(env = "MCP_BEARER_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Analyse a token's claims for Neo4j SSO
    Inspect(InspectArgs),
}

/// OAuth2 grant used by `token acquire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Flow {
    /// Application token (M2M)
    #[default]
    ClientCredentials,
    /// User token via username/password (ROPC)
    Password,
}

/// Arguments for `token acquire`.
#[derive(Debug, Clone, Args)]
pub struct AcquireArgs {
    /// Grant to use
    #[arg(long, value_enum, default_value = "client-credentials")]
    pub flow: Flow,

    /// Print the full token instead of a preview
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub entra: EntraArgs,

    #[command(flatten)]
    pub user: UserArgs,
}

/// Arguments for `token inspect`.
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Token to analyse [default: ID token acquired with the password flow]
    pub token: Option<String>,

    #[command(flatten)]
    pub entra: EntraArgs,

    #[command(flatten)]
    pub user: UserArgs,
}

/// Arguments for the menu.
#[derive(Debug, Clone, Default, Args)]
pub struct MenuArgs {
    /// Run this entry directly (number, or A for all)
    pub choice: Option<String>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
