//! Ad-hoc tool calls: list tools, print the schema, run Cypher.

use crate::cli::{AuthArgs, CypherArgs};
use crate::error::{CliError, Result};
use crate::suites::SuiteContext;
use probe_client::McpSession;
use probe_protocol::{tools, CallToolResult};
use serde_json::{json, Value};

async fn session(auth: &AuthArgs, ctx: &SuiteContext) -> Result<McpSession> {
    let (endpoint, mcp_path) = ctx.endpoint_or_access()?;
    let credentials = ctx.credentials(auth).await?;
    Ok(McpSession::new(
        ctx.client(&endpoint, mcp_path.as_deref())?,
        credentials,
    ))
}

fn print_result(name: &str, result: &CallToolResult, ctx: &SuiteContext) -> Result<()> {
    println!("{}", ctx.formatter.tool_result(result)?);
    if result.is_error {
        return Err(CliError::ToolFailed(name.to_string()));
    }
    Ok(())
}

/// Print the advertised tools.
pub async fn tools(auth: &AuthArgs, ctx: &SuiteContext) -> Result<()> {
    let tools = session(auth, ctx).await?.list_tools().await?;
    println!("{}", ctx.formatter.tools(&tools)?);
    Ok(())
}

/// Print the database schema.
pub async fn schema(auth: &AuthArgs, ctx: &SuiteContext) -> Result<()> {
    let result = session(auth, ctx).await?.get_schema().await?;
    print_result(tools::GET_SCHEMA, &result, ctx)
}

/// Run one Cypher statement.
pub async fn cypher(args: &CypherArgs, ctx: &SuiteContext) -> Result<()> {
    let name = if args.write {
        tools::WRITE_CYPHER
    } else {
        tools::READ_CYPHER
    };
    let arguments = cypher_arguments(&args.query, args.params.as_deref())?;
    let result = session(&args.auth, ctx)
        .await?
        .call_tool(name, arguments)
        .await?;
    print_result(name, &result, ctx)
}

/// `{"query": …}`, plus `params` when given as a JSON object
pub fn cypher_arguments(query: &str, params: Option<&str>) -> Result<Value> {
    if query.trim().is_empty() {
        return Err(CliError::InvalidInput("Cypher query is empty".to_string()));
    }
    let mut arguments = json!({ "query": query });
    if let Some(raw) = params {
        let params: Value = serde_json::from_str(raw)
            .map_err(|e| CliError::InvalidInput(format!("--params is not valid JSON: {}", e)))?;
        if !params.is_object() {
            return Err(CliError::InvalidInput(
                "--params must be a JSON object".to_string(),
            ));
        }
        arguments["params"] = params;
    }
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_only() {
        assert_eq!(
            cypher_arguments("RETURN 1", None).unwrap(),
            json!({"query": "RETURN 1"})
        );
    }

    #[test]
    fn test_query_with_params() {
        let args = cypher_arguments("MATCH (p:Person {name: $name}) RETURN p", Some(r#"{"name": "Ada"}"#))
            .unwrap();
        assert_eq!(args["params"]["name"], "Ada");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(cypher_arguments("  ", None), Err(CliError::InvalidInput(_))));
        assert!(matches!(
            cypher_arguments("RETURN 1", Some("[1, 2]")),
            Err(CliError::InvalidInput(_))
        ));
        assert!(matches!(
            cypher_arguments("RETURN 1", Some("{not json")),
            Err(CliError::InvalidInput(_))
        ));
    }
}
