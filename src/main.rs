use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use macrodeck::{
    Backend, BackendKind, Config, ConfigOverrides, DeckServer, Dispatcher, DryRunBackend,
    SystemBackend, load_deck,
};

/// Macrodeck - trigger local keyboard, window and volume macros over a WebSocket
#[derive(Parser)]
#[command(name = "macrodeck", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "MACRODECK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MACRODECK_PORT")]
    port: Option<u16>,

    /// Password clients must send before any command
    #[arg(long, env = "MACRODECK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory holding config.json and macros/
    #[arg(long, env = "MACRODECK_DECK_DIR")]
    deck_dir: Option<PathBuf>,

    /// Directory with the web UI to serve
    #[arg(long, env = "MACRODECK_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Backend: "system" or "dry-run"
    #[arg(long, env = "MACRODECK_BACKEND")]
    backend: Option<BackendKind>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the server (default)
    Serve,
    /// Load the deck and validate every macro step
    Check,
    /// List loaded macros
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,macrodeck=info",
        1 => "info,macrodeck=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(ConfigOverrides {
        host: cli.host,
        port: cli.port,
        password: cli.password,
        deck_dir: cli.deck_dir,
        static_dir: cli.static_dir,
        backend: cli.backend,
    })?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Check => check(&config),
        Command::List => list(&config),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        deck_dir = %config.deck_dir.display(),
        backend = %config.backend,
        "starting macro deck"
    );

    let deck = load_deck(&config.deck_dir)?;
    if !deck.skipped.is_empty() {
        tracing::warn!(skipped = ?deck.skipped, "some macros could not be loaded");
    }

    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::System => {
            let backend = SystemBackend::new(config.system.clone());
            backend.report_missing_tools();
            Arc::new(backend)
        }
        BackendKind::DryRun => Arc::new(DryRunBackend),
    };

    let bind_addr = config.bind_addr();
    let dispatcher = Dispatcher::new(
        Arc::new(deck.registry),
        backend,
        config.password,
        deck.config_blob,
    );

    DeckServer::new(Arc::new(dispatcher), bind_addr)
        .static_dir(config.static_dir)
        .run()
        .await?;

    Ok(())
}

fn check(config: &Config) -> anyhow::Result<()> {
    let deck = load_deck(&config.deck_dir)?;
    let mut problems = deck.skipped.len();

    for name in &deck.skipped {
        println!("{name}: could not be loaded");
    }

    for (name, r#macro) in deck.registry.iter() {
        let invalid = r#macro.invalid_steps();
        if invalid.is_empty() {
            println!("{name}: ok ({} steps)", r#macro.len());
            continue;
        }
        for (index, error) in &invalid {
            println!("{name}: step {index}: {error}");
        }
        problems += invalid.len();
    }

    if problems > 0 {
        anyhow::bail!("{problems} problem(s) found in {}", config.deck_dir.display());
    }

    println!("All {} macros are valid", deck.registry.len());
    Ok(())
}

fn list(config: &Config) -> anyhow::Result<()> {
    let deck = load_deck(&config.deck_dir)?;

    if deck.registry.is_empty() {
        println!("No macros loaded from {}", config.deck_dir.display());
        return Ok(());
    }

    for (name, r#macro) in deck.registry.iter() {
        println!("{name:<24} {} steps", r#macro.len());
    }
    Ok(())
}
