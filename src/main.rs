use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use readwise_display::board::{BoardStatus, QuoteBoard, RefreshTrigger};
use readwise_display::config::{
    default_config_path, find_config_file, load_config, load_env_config, Config, CONFIG_FILE_NAME,
    MAX_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS,
};
use readwise_display::sampler::QuoteSampler;
use readwise_display::utils::{
    is_terminal, render_json, render_plain, render_styled, DEFAULT_WIDTH,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Readwise Display - Show a random highlight from your Readwise library
#[derive(Parser, Debug)]
#[command(name = "readwise-display")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Show a random highlight from your Readwise library", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Readwise API key (overrides the config file)
    #[arg(long, global = true, env = "READWISE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Readwise API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for quotes
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Styled text on a terminal, plain text otherwise
    Auto,
    /// Plain text
    Plain,
    /// JSON (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one random highlight (default)
    #[command(alias = "q")]
    Quote,

    /// Show a new highlight periodically until interrupted
    #[command(alias = "w")]
    Watch {
        /// Seconds between refreshes (default: display.refresh_interval_secs)
        #[arg(long, short)]
        interval: Option<u64>,
    },

    /// Print the number of highlights in the library
    Count,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a configuration file with defaults (and --api-key, if given)
    Init {
        /// Where to write (default: the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration with the key redacted
    Show,
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("readwise_display={}", level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_env_config().context("Failed to load config from environment")?,
    };

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    if let Some(key) = &cli.api_key {
        config.api.key = Some(key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    config.validate()?;

    match cli.command.as_ref().unwrap_or(&Commands::Quote) {
        Commands::Quote => {
            let mut board = QuoteBoard::new(QuoteSampler::from_config(&config)?);
            board.refresh(RefreshTrigger::Initial).await;
            if let Some(message) = board.status().message() {
                anyhow::bail!("{}", message);
            }
            show(&board, cli.output)?;
        }

        Commands::Watch { interval } => {
            let reload_from = if cli.api_key.is_none() {
                config_path.clone()
            } else {
                None
            };
            watch(&config, watch_interval(*interval, &config), reload_from, cli.output).await?;
        }

        Commands::Count => {
            let sampler = QuoteSampler::from_config(&config)?;
            let count = sampler.fetch_count().await?;
            match resolve_format(cli.output) {
                OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
                _ => println!("{}", count),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => default_config_path().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
                };
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                config.save(&path)?;
                if !cli.quiet {
                    println!("Wrote {}", path.display());
                }
            }
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config.redacted())?);
            }
        },
    }

    Ok(())
}

/// `--interval` if given, else the configured one, kept within the allowed range
fn watch_interval(flag: Option<u64>, config: &Config) -> Duration {
    let seconds = flag
        .unwrap_or(config.display.refresh_interval_secs)
        .clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS);
    Duration::from_secs(seconds)
}

/// Initial load, then a refresh on every tick until Ctrl-C.
///
/// Refreshes are awaited one at a time, so retrievals never overlap. When
/// `reload_from` is set the config file is re-read before each refresh and
/// a changed key is pushed to the board.
async fn watch(
    config: &Config,
    every: Duration,
    reload_from: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut board = QuoteBoard::new(QuoteSampler::from_config(config)?);
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut trigger = RefreshTrigger::Initial;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(path) = &reload_from {
                    reload_credential(&mut board, path);
                }
                if board.current().is_none() {
                    trigger = RefreshTrigger::Initial;
                }
                board.refresh(trigger).await;
                show(&board, format)?;
                trigger = RefreshTrigger::Timer;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; stopping");
                break;
            }
        }
    }

    Ok(())
}

fn reload_credential(board: &mut QuoteBoard, path: &Path) {
    match load_config(path) {
        Ok(fresh) => {
            let key = fresh.api.key.unwrap_or_default();
            if board.set_credential(&key) {
                tracing::info!("API key changed in {}", path.display());
            }
        }
        Err(e) => tracing::warn!("Keeping current API key; failed to reload config: {}", e),
    }
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto if !is_terminal() => OutputFormat::Plain,
        other => other,
    }
}

fn show(board: &QuoteBoard, format: OutputFormat) -> Result<()> {
    if let Some(message) = board.status().message() {
        eprintln!("{}", message);
        return Ok(());
    }

    let Some(quote) = board.current() else {
        if matches!(board.status(), BoardStatus::Loading) {
            eprintln!("Loading quote...");
        }
        return Ok(());
    };

    match resolve_format(format) {
        OutputFormat::Json => println!("{}", render_json(quote)?),
        OutputFormat::Plain => println!("{}\n", render_plain(quote, DEFAULT_WIDTH)),
        OutputFormat::Auto => println!(
            "{}\n",
            render_styled(quote, board.palette_index(), DEFAULT_WIDTH)
        ),
    }
    Ok(())
}
