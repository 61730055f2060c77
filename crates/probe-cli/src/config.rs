//! Configuration management for the CLI.
//!
//! Three sources feed a run:
//! - `~/.mcp-probe/config.toml` holds user preferences ([`Settings`])
//! - `MCP_ACCESS.json` and `APP_REGISTRATION.json` are written by the
//!   deployment scripts and describe the server and the Entra app
//! - `.env` files carry secrets and are loaded into the process environment
//!   before arguments are parsed, so clap's `env` fallbacks see them

use crate::error::{CliError, Result};
use probe_auth::{default_scope, DEFAULT_AUTHORITY_HOST};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deployment record naming the MCP endpoint
pub const ACCESS_FILE: &str = "MCP_ACCESS.json";

/// Entra app registration record
pub const APP_REGISTRATION_FILE: &str = "APP_REGISTRATION.json";

/// API key value the deployment template ships with
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

/// Client secret value the app registration template ships with
pub const SECRET_PLACEHOLDER: &str = "<PASTE_SECRET_VALUE_HERE>";

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Entra authority host (sovereign clouds use another one)
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines and tables
    Table,
    /// Machine-readable JSON
    Json,
}

impl Settings {
    /// Get the settings file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mcp-probe").join("config.toml"))
    }

    /// Load settings from the default path, or defaults when there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load settings from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            timeout_secs: default_timeout_secs(),
            authority_host: default_authority_host(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_timeout_secs() -> u64 {
    probe_client::DEFAULT_TIMEOUT_SECS
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_mcp_path() -> String {
    probe_client::DEFAULT_MCP_PATH.to_string()
}

/// Contents of `MCP_ACCESS.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    /// Server base URL
    #[serde(default)]
    pub endpoint: String,

    /// MCP path below the endpoint
    #[serde(default = "default_mcp_path")]
    pub mcp_path: String,

    /// API key presented as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AccessConfig {
    /// Directories searched for the file, in order
    pub fn search_dirs() -> Vec<PathBuf> {
        let mut dirs_list = vec![PathBuf::from("."), PathBuf::from("..")];
        if let Some(home) = dirs::home_dir() {
            dirs_list.push(home);
        }
        dirs_list
    }

    /// Parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// First file found in `dirs`, parsed.
    pub fn discover_in(dirs: &[PathBuf]) -> Result<Option<Self>> {
        match find_file(ACCESS_FILE, dirs) {
            Some(path) => {
                debug!(path = %path.display(), "Using access config");
                Self::load(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// First file found in the standard locations, parsed.
    pub fn discover() -> Result<Option<Self>> {
        Self::discover_in(&Self::search_dirs())
    }

    /// Replace the key with `key` when one is given.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = present(key) {
            self.api_key = Some(key);
        }
        self
    }

    /// Endpoint, when not blank
    pub fn endpoint(&self) -> Option<&str> {
        let endpoint = self.endpoint.trim();
        (!endpoint.is_empty()).then_some(endpoint)
    }

    /// API key, unless missing or still the placeholder
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != API_KEY_PLACEHOLDER)
    }
}

/// Contents of `APP_REGISTRATION.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRegistration {
    /// Directory (tenant) id
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Application (client) id
    #[serde(default)]
    pub client_id: Option<String>,
}

impl AppRegistration {
    /// Directories searched for the file, in order
    pub fn search_dirs() -> Vec<PathBuf> {
        vec![PathBuf::from("."), PathBuf::from("..")]
    }

    /// First file found in `dirs`, parsed. Unreadable files count as absent.
    pub fn discover_in(dirs: &[PathBuf]) -> Option<Self> {
        let path = find_file(APP_REGISTRATION_FILE, dirs)?;
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(registration) => Some(registration),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring unreadable app registration");
                None
            }
        }
    }

    /// First file found in the standard locations, parsed.
    pub fn discover() -> Option<Self> {
        Self::discover_in(&Self::search_dirs())
    }
}

/// Everything needed to ask Entra for a token
#[derive(Debug, Clone)]
pub struct EntraSettings {
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Custom audience, `api://{client_id}` otherwise
    pub audience: Option<String>,
}

impl EntraSettings {
    /// Combine explicit values with the app registration fallback.
    ///
    /// Fails with the names of every missing variable. A placeholder secret
    /// counts as missing.
    pub fn resolve(
        tenant_id: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        audience: Option<String>,
        registration: Option<&AppRegistration>,
    ) -> Result<Self> {
        let (tenant_id, client_id) = with_registration(tenant_id, client_id, registration);
        let client_secret = present_secret(client_secret);

        match (tenant_id, client_id, client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Ok(Self {
                tenant_id,
                client_id,
                client_secret,
                audience: present(audience),
            }),
            (tenant, client, secret) => {
                let mut missing = Vec::new();
                if tenant.is_none() {
                    missing.push("AZURE_TENANT_ID".to_string());
                }
                if client.is_none() {
                    missing.push("AZURE_CLIENT_ID".to_string());
                }
                if secret.is_none() {
                    missing.push("AZURE_CLIENT_SECRET".to_string());
                }
                Err(CliError::MissingConfig(missing))
            }
        }
    }

    /// Tenant and client ids alone, for commands that need no secret
    pub fn resolve_identity(
        tenant_id: Option<String>,
        client_id: Option<String>,
        registration: Option<&AppRegistration>,
    ) -> Result<(String, String)> {
        match with_registration(tenant_id, client_id, registration) {
            (Some(tenant_id), Some(client_id)) => Ok((tenant_id, client_id)),
            (tenant, client) => {
                let mut missing = Vec::new();
                if tenant.is_none() {
                    missing.push("AZURE_TENANT_ID".to_string());
                }
                if client.is_none() {
                    missing.push("AZURE_CLIENT_ID".to_string());
                }
                Err(CliError::MissingConfig(missing))
            }
        }
    }

    /// Scope requested by the client-credentials flow
    pub fn scope(&self) -> String {
        default_scope(&self.client_id, self.audience.as_deref())
    }
}

fn with_registration(
    tenant_id: Option<String>,
    client_id: Option<String>,
    registration: Option<&AppRegistration>,
) -> (Option<String>, Option<String>) {
    let tenant_id =
        present(tenant_id).or_else(|| registration.and_then(|r| present(r.tenant_id.clone())));
    let client_id =
        present(client_id).or_else(|| registration.and_then(|r| present(r.client_id.clone())));
    (tenant_id, client_id)
}

/// `value` unless it is missing or blank
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`present`], also rejecting the secret placeholder
pub fn present_secret(value: Option<String>) -> Option<String> {
    present(value).filter(|v| v != SECRET_PLACEHOLDER)
}

/// First `dirs[i]/name` that exists
pub fn find_file(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|d| d.join(name)).find(|p| p.is_file())
}

/// Value of `--env-file` in raw arguments, read before clap runs
pub fn env_file_arg<I, S>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--" {
            return None;
        }
        if let Some(value) = arg.strip_prefix("--env-file=") {
            return Some(PathBuf::from(value));
        }
        if arg == "--env-file" {
            return args.next().map(|v| PathBuf::from(v.as_ref()));
        }
    }
    None
}

/// Load `.env` from the working directory, then `env_file` over it.
pub fn load_env(env_file: Option<&Path>) -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }
    if let Some(path) = env_file {
        dotenvy::from_path_override(path).map_err(|e| {
            CliError::Config(format!("Failed to load {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded env file");
    }
    Ok(())
}
