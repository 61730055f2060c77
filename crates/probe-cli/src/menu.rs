//! Interactive menu over the suites.

use crate::cli::{Cli, Command, MenuArgs};
use crate::error::{CliError, Result};
use crate::results::{Outcome, TestResults};
use crate::suites::{self, SuiteContext};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// One menu line
pub struct Entry {
    /// Key typed to select it
    pub key: &'static str,
    /// Description shown in the menu
    pub label: &'static str,
    /// Subcommand and arguments it runs
    pub args: &'static [&'static str],
}

/// Menu entries, in display order
pub const ENTRIES: [Entry; 8] = [
    Entry { key: "1", label: "HTTP mode tests (local server)", args: &["http-mode"] },
    Entry { key: "2", label: "Bearer token client tests", args: &["bearer"] },
    Entry { key: "3", label: "Deployment validation (MCP_ACCESS.json)", args: &["validate"] },
    Entry { key: "4", label: "Read-only verification", args: &["write-check"] },
    Entry { key: "5", label: "List tools", args: &["tools"] },
    Entry { key: "6", label: "Show database schema", args: &["schema"] },
    Entry { key: "7", label: "Inspect ID token (SSO troubleshooting)", args: &["token", "inspect"] },
    Entry { key: "8", label: "Entra M2M validation", args: &["entra-validate"] },
];

/// Keys run by "all": every suite that needs no interaction
pub const ALL_KEYS: [&str; 5] = ["1", "2", "3", "4", "8"];

/// Parsed menu input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Run one entry (index into [`ENTRIES`])
    Entry(usize),
    /// Run every suite in [`ALL_KEYS`]
    All,
    /// Show the menu again
    Help,
    /// Leave the menu
    Quit,
}

/// Parse one line of menu input.
pub fn parse_choice(input: &str) -> Result<Choice> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "q" | "quit" | "exit" => Ok(Choice::Quit),
        "a" | "all" => Ok(Choice::All),
        "h" | "?" | "help" | "" => Ok(Choice::Help),
        key => ENTRIES
            .iter()
            .position(|e| e.key == key)
            .map(Choice::Entry)
            .ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "Unknown choice: {}. Enter 1-{}, A or Q.",
                    key,
                    ENTRIES.len()
                ))
            }),
    }
}

/// Command for an entry, parsed like a command line so `env` fallbacks apply.
pub fn command_for(entry: &Entry) -> Result<Command> {
    let argv = std::iter::once("mcp-probe").chain(entry.args.iter().copied());
    let cli = Cli::try_parse_from(argv).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    cli.command
        .ok_or_else(|| CliError::InvalidInput(format!("No command for entry {}", entry.key)))
}

/// Run the menu.
///
/// With a choice the entry runs once and its results are returned; otherwise
/// the menu loops until the user quits.
pub async fn run(args: &MenuArgs, ctx: &SuiteContext) -> Result<Option<TestResults>> {
    if let Some(choice) = &args.choice {
        return run_choice(parse_choice(choice)?, ctx).await;
    }

    let formatter = &ctx.formatter;
    let mut editor = DefaultEditor::new().map_err(|e| {
        CliError::Io(std::io::Error::other(format!(
            "Failed to initialize editor: {}",
            e
        )))
    })?;

    print_menu(ctx);
    loop {
        match editor.readline("mcp-probe> ") {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    editor.add_history_entry(line).ok();
                }

                match parse_choice(line) {
                    Ok(Choice::Quit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(Choice::Help) => print_menu(ctx),
                    Ok(choice) => match run_choice(choice, ctx).await {
                        Ok(Some(results)) => match formatter.summary(&results) {
                            Ok(summary) => println!("{}", summary),
                            Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                        },
                        Ok(None) => {}
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                    Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'q' to quit"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    Ok(None)
}

async fn run_choice(choice: Choice, ctx: &SuiteContext) -> Result<Option<TestResults>> {
    match choice {
        Choice::Entry(index) => suites::execute(command_for(&ENTRIES[index])?, ctx).await,
        Choice::All => run_all(ctx).await.map(Some),
        Choice::Help => {
            print_menu(ctx);
            Ok(None)
        }
        Choice::Quit => Ok(None),
    }
}

/// Run every suite in [`ALL_KEYS`] and aggregate the results.
///
/// A suite that cannot start (missing configuration, say) becomes one
/// failed check instead of stopping the rest.
pub async fn run_all(ctx: &SuiteContext) -> Result<TestResults> {
    let mut total = TestResults::new("all");
    for entry in ENTRIES.iter().filter(|e| ALL_KEYS.contains(&e.key)) {
        let outcome = match command_for(entry) {
            Ok(command) => suites::execute(command, ctx).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(Some(results)) => total.absorb(results),
            Ok(None) => {}
            Err(e) => {
                let check = total.record(entry.args[0], Outcome::Fail, e.to_string());
                ctx.formatter.emit(ctx.formatter.check(check));
            }
        }
    }
    Ok(total)
}

fn print_menu(ctx: &SuiteContext) {
    let formatter = &ctx.formatter;
    println!("{}", formatter.header("MCP Probe"));
    for entry in &ENTRIES {
        println!("  {}. {}", entry.key, entry.label);
    }
    println!("  A. Run all suites ({})", ALL_KEYS.join(", "));
    println!("  Q. Quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1").unwrap(), Choice::Entry(0));
        assert_eq!(parse_choice(" 8 ").unwrap(), Choice::Entry(7));
        assert_eq!(parse_choice("A").unwrap(), Choice::All);
        assert_eq!(parse_choice("all").unwrap(), Choice::All);
        assert_eq!(parse_choice("Q").unwrap(), Choice::Quit);
        assert_eq!(parse_choice("").unwrap(), Choice::Help);
    }

    #[test]
    fn test_parse_choice_unknown() {
        assert!(matches!(parse_choice("9"), Err(CliError::InvalidInput(_))));
        assert!(matches!(parse_choice("bearer"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_every_entry_parses() {
        for entry in &ENTRIES {
            let command = command_for(entry).unwrap();
            assert!(!matches!(command, Command::Menu(_)));
        }
        assert!(matches!(command_for(&ENTRIES[6]).unwrap(), Command::Token(_)));
    }

    #[test]
    fn test_all_keys_exist() {
        for key in ALL_KEYS {
            assert!(ENTRIES.iter().any(|e| e.key == key));
        }
    }
}
