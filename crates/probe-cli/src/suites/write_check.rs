//! Read-only verification.

use crate::cli::WriteCheckArgs;
use crate::error::Result;
use crate::results::{Recorder, TestResults};
use crate::suites::SuiteContext;
use probe_client::{ClientError, McpSession};
use probe_protocol::tools;

/// Side-effect-free statement sent to `write-cypher`
pub const PROBE_QUERY: &str = "RETURN 1 AS probe";

const LIST_TOOLS: &str = "List tools";
const NO_WRITE_TOOL: &str = "write-cypher not advertised";
const WRITE_REJECTED: &str = "write-cypher rejected";

/// Run the suite.
pub async fn run(args: &WriteCheckArgs, ctx: &SuiteContext) -> Result<TestResults> {
    let (endpoint, mcp_path) = ctx.endpoint_or_access()?;
    let credentials = ctx.credentials(&args.auth).await?;
    let session = McpSession::new(ctx.client(&endpoint, mcp_path.as_deref())?, credentials);

    let mut rec = Recorder::new("write-check", &ctx.formatter);
    rec.header("Read-Only Verification");
    rec.info(format!("Endpoint: {}", session.client().mcp_url()));
    rec.info(format!("Auth: {}", session.credentials().scheme()));

    let names = match session.list_tools().await {
        Ok(tools) => {
            let names: Vec<String> = tools.into_iter().map(|t| t.name).collect();
            rec.pass(LIST_TOOLS, format!("{} tools advertised: {}", names.len(), names.join(", ")));
            names
        }
        Err(e) => {
            rec.fail(LIST_TOOLS, e.to_string());
            rec.skip(NO_WRITE_TOOL, "tool list unavailable");
            rec.skip(WRITE_REJECTED, "tool list unavailable");
            return Ok(rec.finish());
        }
    };

    if names.iter().any(|n| n == tools::WRITE_CYPHER) {
        rec.fail(NO_WRITE_TOOL, "write-cypher is advertised, the server is not read-only");
    } else {
        rec.pass(NO_WRITE_TOOL, "Only read tools are exposed");
    }

    if !args.probe_write {
        rec.skip(WRITE_REJECTED, "use --probe-write to call write-cypher");
        return Ok(rec.finish());
    }

    match session.write_cypher(PROBE_QUERY).await {
        Ok(result) if result.is_error => rec.pass(
            WRITE_REJECTED,
            format!(
                "Rejected by the tool: {}",
                result.first_text().unwrap_or("no message")
            ),
        ),
        Ok(_) => rec.fail(WRITE_REJECTED, "write-cypher accepted a query"),
        Err(ClientError::Rpc { code, message }) => {
            rec.pass(WRITE_REJECTED, format!("Rejected with JSON-RPC error {}: {}", code, message))
        }
        Err(e @ ClientError::Forbidden) => rec.pass(WRITE_REJECTED, format!("Rejected: {}", e)),
        Err(e) => rec.fail(WRITE_REJECTED, format!("Call failed: {}", e)),
    }

    Ok(rec.finish())
}
