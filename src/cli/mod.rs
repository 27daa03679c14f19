//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Quote Keeper - keep, filter and sync a personal list of quotes.
///
/// Run `quotes shell` for an interactive session with background sync.
#[derive(Parser, Debug)]
#[command(name = "quotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format: text, json, or table.
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,

    /// Data directory (defaults to ~/.quote-keeper).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote from a category (remembered for next time).
    Show {
        /// Category to filter by, or "all". Uses the saved selection if omitted.
        category: Option<String>,
    },

    /// Show a random quote from all categories.
    Next,

    /// Add a new quote.
    Add {
        /// Quote text.
        text: String,

        /// Quote category.
        category: String,
    },

    /// List categories, marking the saved selection.
    Categories,

    /// List all quotes.
    List,

    /// Export all quotes as JSON.
    Export {
        /// Output file path ("-" for stdout).
        #[arg(short, long, default_value = "quotes.json")]
        output: String,
    },

    /// Import quotes from a JSON file.
    Import {
        /// File containing a JSON array of quotes.
        path: PathBuf,
    },

    /// Fetch and merge remote quotes once.
    Sync,

    /// Show the result of the last sync.
    Status,

    /// Interactive session with periodic background sync.
    Shell,

    /// Show the effective configuration.
    Config {
        /// Write a default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}

/// One line typed into the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show,
    Next,
    Filter(String),
    Add { text: String, category: String },
    Categories,
    List,
    Last,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Sync,
    Status,
    Help,
    Quit,
}

/// Help text for the interactive shell.
pub const SHELL_HELP: &str = "\
Commands:
  show                     show the current quote again
  next                     show a random quote
  filter <category|all>    filter by category
  add <text> | <category>  add a quote
  categories               list categories
  list                     list all quotes
  last                     show the last viewed quote
  export [path]            export to quotes.json (or path)
  import <path>            import quotes from a JSON file
  sync                     sync with the server now
  status                   show sync and notification status
  help                     show this help
  quit                     leave the shell";

impl std::str::FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word {
            "show" => Ok(Self::Show),
            "next" | "n" => Ok(Self::Next),
            "filter" | "f" if !rest.is_empty() => Ok(Self::Filter(rest.to_string())),
            "filter" | "f" => Err("Usage: filter <category|all>".into()),
            "add" => {
                let (text, category) = rest
                    .split_once('|')
                    .ok_or_else(|| "Usage: add <text> | <category>".to_string())?;
                Ok(Self::Add {
                    text: text.to_string(),
                    category: category.to_string(),
                })
            }
            "categories" | "cats" => Ok(Self::Categories),
            "list" | "ls" => Ok(Self::List),
            "last" => Ok(Self::Last),
            "export" => Ok(Self::Export(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "import" if !rest.is_empty() => Ok(Self::Import(PathBuf::from(rest))),
            "import" => Err("Usage: import <path>".into()),
            "sync" => Ok(Self::Sync),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command: {other}. Type 'help'.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from(["quotes", "add", "Stay curious.", "Life"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Add { ref text, ref category } if text == "Stay curious." && category == "Life"
        ));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quotes", "list", "-f", "table", "-vv"]).unwrap();
        assert_eq!(cli.output_format(), Ok(OutputFormat::Table));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_export_default_path() {
        let cli = Cli::try_parse_from(["quotes", "export"]).unwrap();
        assert!(matches!(cli.command, Commands::Export { ref output } if output == "quotes.json"));
    }

    #[test]
    fn test_shell_add_splits_on_pipe() {
        let cmd: ShellCommand = "add Be kind. | Life".parse().unwrap();
        assert_eq!(
            cmd,
            ShellCommand::Add {
                text: "Be kind. ".into(),
                category: " Life".into()
            }
        );
    }

    #[test]
    fn test_shell_filter_and_export() {
        assert_eq!(
            "filter Work".parse::<ShellCommand>(),
            Ok(ShellCommand::Filter("Work".into()))
        );
        assert!("filter".parse::<ShellCommand>().is_err());
        assert_eq!(
            "export".parse::<ShellCommand>(),
            Ok(ShellCommand::Export(None))
        );
        assert_eq!(
            "export out.json".parse::<ShellCommand>(),
            Ok(ShellCommand::Export(Some(PathBuf::from("out.json"))))
        );
    }

    #[test]
    fn test_shell_show_and_status() {
        assert_eq!("show".parse::<ShellCommand>(), Ok(ShellCommand::Show));
        assert_eq!("status".parse::<ShellCommand>(), Ok(ShellCommand::Status));
        assert_eq!("".parse::<ShellCommand>(), Err(String::new()));
    }

    #[test]
    fn test_shell_unknown_command() {
        assert!("dance".parse::<ShellCommand>().is_err());
        assert_eq!("  q ".parse::<ShellCommand>(), Ok(ShellCommand::Quit));
    }
}
