use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::task::JoinHandle;
use tracing::{error, info};

use chat_filter::auth::{AuthGate, IamValidationBackend, TokenValidator};
use chat_filter::config::Config;
use chat_filter::dictionary::ProfanityDictionary;
use chat_filter::filter::FilterService;
use chat_filter::profanity::detector::DictionaryDetector;
use chat_filter::profanity::traits::ProfanityFilter;
use chat_filter::web::{self, AppState};

/// chat-filter: dictionary-driven chat moderation.
///
/// Classifies chat messages as clean or profane and censors profane text,
/// for host platforms that delegate chat filtering over RPC.
#[derive(Parser)]
#[command(name = "chat-filter", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the moderation service
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "6565")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Run the engine on text and print the verdict
    Check {
        /// Text to classify (each argument checked separately)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Load the configured dictionary and print its term counts
    Dictionary,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chat_filter=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, bind } => {
            info!("Starting chat-filter...");
            let detector = load_detector(&config)?;
            let (gate, refresh) = build_gate(&config).await?;

            let state = AppState {
                filter: FilterService::new(Arc::new(detector)),
                gate,
                request_timeout: config.request_timeout,
            };
            web::run_server(state, port, &bind, shutdown_signal()).await?;

            if let Some(handle) = refresh {
                handle.abort();
                info!("Stopped validation context refresh");
            }
            info!("chat-filter stopped");
        }

        Commands::Check { text } => {
            let detector = load_detector(&config)?;
            for line in &text {
                if detector.is_profane(line) {
                    println!("{}  {}", "CENSORED".red().bold(), detector.censor(line));
                } else {
                    println!("{}      {}", "PASS".green().bold(), line);
                }
            }
        }

        Commands::Dictionary => {
            let dictionary = ProfanityDictionary::load(config.dictionary_path.as_deref())?;
            let stats = dictionary.stats();
            match &config.dictionary_path {
                Some(path) => println!("Dictionary: built-in + {}", path.display()),
                None => println!("Dictionary: built-in only"),
            }
            println!("  Profanities:     {}", stats.profanities);
            println!("  False negatives: {}", stats.false_negatives);
            println!("  False positives: {}", stats.false_positives);
            println!("  {} {}", "Effective terms:".bold(), stats.effective);
        }
    }

    Ok(())
}

/// Load the dictionary and compile the engine. Any error aborts startup.
fn load_detector(config: &Config) -> Result<DictionaryDetector> {
    let dictionary = ProfanityDictionary::load(config.dictionary_path.as_deref())?;
    let stats = dictionary.stats();
    info!(
        profanities = stats.profanities,
        false_negatives = stats.false_negatives,
        false_positives = stats.false_positives,
        "Loaded profanity dictionary"
    );
    Ok(DictionaryDetector::new(&dictionary)?)
}

/// Build the authorization gate, starting its refresh task when enabled.
async fn build_gate(config: &Config) -> Result<(AuthGate, Option<JoinHandle<()>>)> {
    if !config.auth_enabled {
        info!("Authorization disabled; all calls are accepted");
        return Ok((AuthGate::Disabled, None));
    }

    config.require_iam()?;
    let backend = IamValidationBackend::new(
        &config.iam_base_url,
        config.iam_client_id.clone(),
        config.iam_client_secret.clone(),
    );
    let validator =
        Arc::new(TokenValidator::initialize(Arc::new(backend), config.refresh_interval).await?);
    let refresh = validator.spawn_refresh();
    info!(
        refresh_interval = ?config.refresh_interval,
        "Authorization enabled"
    );
    Ok((AuthGate::Enabled(validator), Some(refresh)))
}

/// Resolve on Ctrl-C or, on unix, SIGTERM from the process supervisor.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
