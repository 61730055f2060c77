//! Authentication helpers for the MCP probes.
//!
//! Covers everything between "I have some secrets" and "I have an
//! `Authorization` header":
//!
//! - [`Credentials`] renders bearer and basic headers
//! - [`EntraApp`] acquires tokens from Azure Entra ID (client credentials
//!   and ROPC flows)
//! - [`decode_unverified`] and [`TokenClaims`] take a JWT apart for
//!   diagnostics
//! - [`jwks`] verifies a token's signature against the tenant's published
//!   keys
//!
//! # Example
//!
//! ```
//! use probe_auth::Credentials;
//!
//! let creds = Credentials::basic("neo4j", "secret");
//! assert_eq!(creds.authorization_header(), "Basic bmVvNGo6c2VjcmV0");
//! ```

#![warn(missing_docs)]

pub mod claims;
mod entra;
mod error;
mod header;
pub mod jwks;
mod jwt;

pub use claims::{ClaimReport, Finding, Severity, TokenClaims, TokenVersion};
pub use entra::{default_scope, EntraApp, TokenResponse, DEFAULT_AUTHORITY_HOST, ROPC_SCOPES};
pub use error::AuthError;
pub use header::{basic_header, mask_identifier, token_preview, Credentials};
pub use jwt::{decode_unverified, DecodedJwt};
