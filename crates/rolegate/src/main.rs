//! rolegate: Discord verification gateway main binary
//!
//! Main entry point for the rolegate application.
//!
//! Usage:
//!   rolegate             - Start both services (code backend + Discord bot)
//!   rolegate --api-only  - Start only the code backend
//!   rolegate --bot-only  - Start only the Discord bot
//!   rolegate --help      - Show help

use rolegate_core::{CodeSource, CodeStore, Config};
use rolegate_discord::VerifyBot;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Both services (code backend + Discord bot)
    Full,
    /// Code backend only
    ApiOnly,
    /// Discord bot only
    BotOnly,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("rolegate {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (rolegate.toml, then environment)
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting rolegate...");

    match mode {
        RunMode::ApiOnly => run(config, true, false).await,
        RunMode::BotOnly => run(config, false, true).await,
        _ => run(config, true, true).await,
    }
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--api-only" => return RunMode::ApiOnly,
            "--bot-only" => return RunMode::BotOnly,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Full
}

/// Print help message
fn print_help() {
    println!("rolegate - Discord verification gateway");
    println!();
    println!("Usage:");
    println!("  rolegate             Start both the code backend and the Discord bot");
    println!("  rolegate --api-only  Start only the HTTP code backend");
    println!("  rolegate --bot-only  Start only the Discord bot");
    println!("  rolegate --help      Show this help message");
    println!("  rolegate --version   Show version");
    println!();
    println!("Environment Variables:");
    println!("  DISCORD_BOT_TOKEN    Discord bot token");
    println!("  GUILD_ID             Guild holding the verified role");
    println!("  VERIFIED_ROLE_ID     Role granted on verification");
    println!("  CHANNEL_ID           Channel for the verification panel");
    println!("  BOT_ID               Bot user id shown in the panel");
    println!("  VERIFICATION_URL     Link template sent to requesters ({{}} -> session id)");
    println!("  API_PORT             Code backend port (default: 5000)");
    println!("  DIST_DIR             Frontend bundle directory (default: dist)");
    println!("  BACKEND_URL          Code endpoint base URL for the bot");
    println!("  CODE_TTL_SECS        Code lifetime in seconds (default: 300)");
    println!("  CODE_LENGTH          Digits per code (default: 6)");
}

/// Run the requested services until Ctrl+C
async fn run(config: Config, with_api: bool, with_bot: bool) -> anyhow::Result<()> {
    // Track running services for shutdown
    let mut service_handles = Vec::new();

    // The store lives in-process whenever the backend runs here; bot-only
    // deployments reach a remote backend over HTTP instead.
    let store = with_api.then(|| {
        Arc::new(CodeStore::with_settings(
            config.verification.ttl(),
            config.verification.code_length,
        ))
    });

    if let Some(store) = &store {
        let port = config.api.port;
        let dist_dir = config.api.dist_dir.clone();
        let store = Arc::clone(store);

        let handle = tokio::spawn(async move {
            if let Err(e) = rolegate_api::start_server(port, &dist_dir, store).await {
                tracing::error!("Code backend error: {}", e);
            }
        });
        service_handles.push(handle);
        tracing::info!("Code backend started on port {}", port);
    }

    if with_bot {
        if config.discord.is_some() {
            let bot = match &store {
                Some(store) => {
                    VerifyBot::with_code_source(&config, Arc::clone(store) as Arc<dyn CodeSource>)?
                }
                None => VerifyBot::new(&config)?,
            };

            let handle = tokio::spawn(async move {
                if let Err(e) = bot.start().await {
                    tracing::error!("Discord bot error: {}", e);
                }
            });
            service_handles.push(handle);
            tracing::info!("Discord bot started");
        } else if with_api {
            tracing::info!("Discord bot disabled (no token configured)");
        } else {
            anyhow::bail!("Discord bot requested but no token configured");
        }
    }

    tracing::info!("rolegate initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    // Abort all services
    for handle in service_handles {
        handle.abort();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
