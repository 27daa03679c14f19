//! Quote Keeper - keep, filter and sync a personal list of quotes.
//!
//! Quotes and the selected category are stored in a local `SQLite` key/value
//! store. A small page of remote items can be merged in on demand or
//! periodically from the interactive shell.
//!
//!   quotes show Work                  # Random quote from "Work" (remembered)
//!   quotes next                       # Random quote from any category
//!   quotes add "Be kind." Life        # Add a quote
//!   quotes export -o backup.json      # Export as pretty JSON
//!   quotes import backup.json         # Append quotes from a file
//!   quotes shell                      # Interactive session with background sync

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_banner, format_categories, format_quotes, format_rendered, format_sync_status,
    read_import, write_export, OutputFormat, QuoteSession, QuoteStore, SharedSession, SyncAgent,
    EXPORT_FILE_NAME,
};
use cli::{Cli, Commands, ShellCommand, SHELL_HELP};
use domain::{AppConfig, AppError, CategoryFilter, SyncOutcome};
use infrastructure::{
    ensure_config_exists, load_config, render_config, HttpRemoteSource, LocalStorage,
    SessionStorage,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        report_error(&e);
        std::process::exit(1);
    }
}

/// Print an error; validation messages are shown as plain alerts.
fn report_error(e: &AppError) {
    if e.is_user_facing() {
        eprintln!("{}", e.to_string().yellow().bold());
    } else {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| AppError::Config { message: e })?;
    let config = load_config(cli.data_dir.as_deref())?;

    if let Commands::Config { init } = cli.command {
        return cmd_config(&config, init);
    }

    let mut session = open_session(&config)?;

    match cli.command {
        Commands::Show { category } => {
            let filter = category.as_deref().map_or_else(
                || session.selected().clone(),
                CategoryFilter::from,
            );
            let rendered = session.filter_and_show(filter)?;
            println!("{}", format_rendered(&rendered));
        }
        Commands::Next => {
            let rendered = session.show_random()?;
            println!("{}", format_rendered(&rendered));
        }
        Commands::Add { text, category } => {
            session.add_quote(&text, &category)?;
            println!("{} Quote added successfully!", "✓".green().bold());
        }
        Commands::Categories => {
            println!(
                "{}",
                format_categories(session.categories(), session.selected())
            );
        }
        Commands::List => {
            let output =
                format_quotes(session.quotes(), format).map_err(AppError::serialization)?;
            println!("{output}");
        }
        Commands::Export { output } => {
            cmd_export(&session, &output).await?;
        }
        Commands::Import { path } => {
            let quotes = read_import(&path).await?;
            let rendered = session.import_quotes(quotes)?;
            println!("{} Quotes imported successfully!", "✓".green().bold());
            println!("{}", format_rendered(&rendered));
        }
        Commands::Sync => {
            cmd_sync(session, &config).await?;
        }
        Commands::Status => {
            println!("{}", format_sync_status(&session.sync_status()?));
        }
        Commands::Shell => {
            run_shell(session, &config).await?;
        }
        // Handled before the session is opened
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Open the durable store and bootstrap a session over it.
fn open_session(config: &AppConfig) -> domain::Result<QuoteSession> {
    let durable = LocalStorage::open(&config.storage_db_path())?;
    let store = QuoteStore::new(Box::new(durable), Box::new(SessionStorage::new()));

    QuoteSession::bootstrap(
        store,
        StdRng::from_entropy(),
        config.notifications.ttl(),
    )
}

/// Export quotes to a file or stdout.
async fn cmd_export(session: &QuoteSession, output: &str) -> domain::Result<()> {
    if output == "-" {
        println!("{}", session.export_json()?);
        return Ok(());
    }

    write_export(Path::new(output), session.quotes()).await?;
    println!(
        "{} Exported {} quotes to {}",
        "✓".green().bold(),
        session.quotes().len(),
        output
    );

    Ok(())
}

/// Run one sync tick and report it.
async fn cmd_sync(session: QuoteSession, config: &AppConfig) -> domain::Result<()> {
    let shared: SharedSession = Arc::new(Mutex::new(session));
    let source = HttpRemoteSource::new(&config.sync)?;
    println!("Syncing with {}", source.endpoint().cyan());
    let agent = SyncAgent::new(source, Arc::clone(&shared), &config.sync);

    let outcome = agent.tick().await?;
    flush_background(&shared).await;
    print_outcome(&outcome);

    Ok(())
}

/// Show or initialize the configuration.
fn cmd_config(config: &AppConfig, init: bool) -> domain::Result<()> {
    if init {
        let (path, created) = ensure_config_exists(config)?;
        if created {
            println!("{} Created {}", "✓".green().bold(), path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
    }

    println!("{}", render_config(config)?);
    Ok(())
}

fn print_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Failed { .. } => println!("{} Sync {}", "✗".red().bold(), outcome),
        _ => println!("{} Sync {}", "✓".green().bold(), outcome),
    }
}

/// Print notifications and background view changes. Returns true if
/// anything was printed.
async fn flush_background(shared: &SharedSession) -> bool {
    let mut session = shared.lock().await;
    let notices = session.notices().take_unseen();
    let view = session.take_pending_view();
    drop(session);

    for notice in &notices {
        eprintln!("{}", format_banner(notice));
    }
    if let Some(view) = &view {
        println!("{}", format_rendered(view));
    }

    !notices.is_empty() || view.is_some()
}

fn print_prompt() {
    print!("{} ", ">".cyan().bold());
    let _ = std::io::stdout().flush();
}

/// Interactive session. The sync agent runs for as long as the shell does.
async fn run_shell(session: QuoteSession, config: &AppConfig) -> domain::Result<()> {
    let shared: SharedSession = Arc::new(Mutex::new(session));

    {
        let mut session = shared.lock().await;
        let rendered = if session.selected().is_all() {
            session.show_random()?
        } else {
            session.refresh_view()?
        };
        println!("{}", format_rendered(&rendered));
    }

    let agent = Arc::new(SyncAgent::new(
        HttpRemoteSource::new(&config.sync)?,
        Arc::clone(&shared),
        &config.sync,
    ));
    let handle = config.sync.enabled.then(|| agent.start());

    println!("{}", "Type 'help' for commands.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut banner_check = tokio::time::interval(Duration::from_secs(1));
    print_prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.map_err(|e| AppError::io("Failed to read input", e))? else {
                    break;
                };

                match line.parse::<ShellCommand>() {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) =
                            exec_shell_command(command, &shared, &agent, handle.is_some()).await
                        {
                            report_error(&e);
                        }
                    }
                    Err(message) if message.is_empty() => {}
                    Err(message) => eprintln!("{message}"),
                }

                flush_background(&shared).await;
                print_prompt();
            }
            _ = banner_check.tick() => {
                if flush_background(&shared).await {
                    print_prompt();
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    if let Some(handle) = handle {
        handle.stop().await;
    }

    Ok(())
}

/// Execute one shell command against the shared session.
async fn exec_shell_command(
    command: ShellCommand,
    shared: &SharedSession,
    agent: &SyncAgent<HttpRemoteSource>,
    background_sync: bool,
) -> domain::Result<()> {
    match command {
        ShellCommand::Show => match shared.lock().await.current() {
            Some(rendered) => println!("{}", format_rendered(rendered)),
            None => println!("{}", "Nothing shown yet.".dimmed()),
        },
        ShellCommand::Next => {
            let rendered = shared.lock().await.show_random()?;
            println!("{}", format_rendered(&rendered));
        }
        ShellCommand::Filter(category) => {
            let rendered = shared
                .lock()
                .await
                .filter_and_show(CategoryFilter::from(category.as_str()))?;
            println!("{}", format_rendered(&rendered));
        }
        ShellCommand::Add { text, category } => {
            shared.lock().await.add_quote(&text, &category)?;
            println!("{} Quote added successfully!", "✓".green().bold());
        }
        ShellCommand::Categories => {
            let session = shared.lock().await;
            println!(
                "{}",
                format_categories(session.categories(), session.selected())
            );
        }
        ShellCommand::List => {
            let session = shared.lock().await;
            let output = format_quotes(session.quotes(), OutputFormat::Text)
                .map_err(AppError::serialization)?;
            println!("{output}");
        }
        ShellCommand::Last => match shared.lock().await.last_viewed()? {
            Some(quote) => println!("{quote}"),
            None => println!("{}", "No quote viewed yet in this session.".dimmed()),
        },
        ShellCommand::Export(path) => {
            let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            let quotes = shared.lock().await.quotes().to_vec();
            write_export(&path, &quotes).await?;
            println!(
                "{} Exported {} quotes to {}",
                "✓".green().bold(),
                quotes.len(),
                path.display()
            );
        }
        ShellCommand::Import(path) => {
            let quotes = read_import(&path).await?;
            let rendered = shared.lock().await.import_quotes(quotes)?;
            println!("{} Quotes imported successfully!", "✓".green().bold());
            println!("{}", format_rendered(&rendered));
        }
        ShellCommand::Sync => {
            let outcome = agent.tick().await?;
            print_outcome(&outcome);
        }
        ShellCommand::Status => {
            let mut session = shared.lock().await;
            println!("{}", format_sync_status(&session.sync_status()?));

            let agent_state = if background_sync {
                format!("{:?}", agent.phase()).to_lowercase()
            } else {
                "disabled".to_string()
            };
            println!("  Background sync: {}", agent_state.cyan());
            println!(
                "  Active notifications: {}",
                session.notices().active().len()
            );
        }
        ShellCommand::Help => println!("{SHELL_HELP}"),
        ShellCommand::Quit => {}
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
