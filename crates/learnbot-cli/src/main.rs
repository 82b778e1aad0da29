//! learnbot CLI
//!
//! Runs the LINE webhook server, or previews a synthetic learning report
//! without any network access.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use learnbot_report::{
    compose, render_report, FlexSerializer, OutlineSerializer, ScoredSession, SessionGenerator,
};
use learnbot_server::{create_router, AppState, Config, REPORT_ALT_TEXT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Advice used by `preview` when none is given.
const PREVIEW_ADVICE: &str = "繼續保持學習熱忱！";

/// learnbot - LINE learning report bot
///
/// Tracks LINE users and broadcasts learning reports, rendered as rich cards,
/// whenever the game client reports a finished session.
#[derive(Parser, Debug)]
#[command(name = "learnbot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the webhook server
    Serve {
        /// Path to configuration file (default: learnbot.json in current directory)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render a synthetic learning report
    Preview {
        /// Seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,

        /// Advice line to include in the report
        #[arg(long, default_value = PREVIEW_ADVICE)]
        advice: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = PreviewFormat::Outline)]
        format: PreviewFormat,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PreviewFormat {
    /// Composed report text as sent to chat
    Text,
    /// Indented outline of the rendered card
    Outline,
    /// LINE flex message JSON
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match args.command {
        Command::Serve { config, port } => serve(config.as_deref(), port).await,
        Command::Preview {
            seed,
            advice,
            format,
            output,
        } => preview(seed, &advice, format, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

// ============================================================================
// serve
// ============================================================================

async fn serve(config_path: Option<&Path>, port: Option<u16>) -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }
    config.validate()?;
    config.require_line_credentials()?;

    print_config(&config);

    let addr = config.bind_address();
    let state = AppState::from_config(config).await?;
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind to {addr}: {e}\n\nSuggestion: Check if the port is already in use")
    })?;

    println!("learnbot listening on http://{addr}");
    println!("Press Ctrl+C to stop");
    tracing::info!(addr = %addr, "Server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, shutting down");
            }
        })
        .await?;

    Ok(())
}

/// Loads configuration from the given path or the default location,
/// applying environment overrides in both cases.
fn load_config(config_path: Option<&Path>) -> anyhow::Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            let mut config = Config::load_from_file(path)?;
            config.apply_env()?;
            Ok(config)
        }
        None => Ok(Config::load()?),
    }
}

fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Address: {}", config.bind_address());
    println!("  Trigger keyword: {}", config.trigger_keyword);
    println!("  User store: {}", config.user_store_path);
    if config.gemini.enabled() {
        println!("  Advice: Gemini ({})", config.gemini.model);
    } else {
        println!("  Advice: fixed ({})", config.gemini.fallback_advice);
    }
}

// ============================================================================
// preview
// ============================================================================

fn preview(
    seed: Option<u64>,
    advice: &str,
    format: PreviewFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let session = match seed {
        Some(seed) => SessionGenerator::synthetic(&mut StdRng::seed_from_u64(seed)),
        None => SessionGenerator::random(),
    };
    tracing::debug!(?session, "Generated session");

    let rendered = render_preview(&session, advice, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).map_err(|e| {
                anyhow::anyhow!("Failed to write preview to '{}': {e}", path.display())
            })?;
            println!("Preview written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_preview(
    session: &ScoredSession,
    advice: &str,
    format: PreviewFormat,
) -> anyhow::Result<String> {
    let text = compose(session, advice);

    Ok(match format {
        PreviewFormat::Text => text,
        PreviewFormat::Outline => OutlineSerializer::new().outline(&render_report(&text)),
        PreviewFormat::Json => {
            let message = FlexSerializer::new().flex_message(REPORT_ALT_TEXT, &render_report(&text));
            serde_json::to_string_pretty(&message)?
        }
    })
}
