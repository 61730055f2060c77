//! mcp-probe library.
//!
//! Validation suites for a Neo4j MCP server exposed over HTTP, plus the
//! token tooling used to troubleshoot its Azure Entra ID setup. The binary
//! is a thin wrapper over [`suites::execute`] and [`menu::run`].

pub mod cli;
pub mod config;
pub mod error;
pub mod menu;
pub mod output;
pub mod results;
pub mod suites;

pub use cli::{Cli, Command};
pub use config::Settings;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use results::{Outcome, TestResults};
pub use suites::SuiteContext;
