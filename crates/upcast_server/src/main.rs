//! Headless API server entrypoint.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upcast_core::{Ledger, ToggleOps, DEFAULT_PORT};
use upcast_server::{config::Config, db::Database, serve_router, AppState};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    recount: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--recount" => flags.recount = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

fn run_recount(database: &Database) -> anyhow::Result<()> {
    for ledger in Ledger::ALL {
        let report = ToggleOps::recount(database, ledger)?;
        println!(
            "{:<16} scanned {:>6}  corrected {:>6}",
            ledger.name(),
            report.targets_scanned,
            report.targets_corrected
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upcast=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;

    if cli_flags.recount {
        return run_recount(&database);
    }

    let state = AppState::new(config.clone(), database);

    let allow_public = upcast_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }
    if config.push_notifications {
        tracing::info!("Push delivery enabled; target base {}", config.app_url);
    }

    let bind_addr = upcast_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("Upcast running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("Server stopped");

    Ok(())
}

fn print_help() {
    println!("Upcast Server\n");
    println!("Usage: upcast [OPTIONS]\n");
    println!("Options:");
    println!("  --recount         Rebuild upvote and save counters from memberships, then exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/upcast/db)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  MAX_BODY_SIZE     Maximum request body in bytes (default: 1MB)");
    println!("  APP_URL           Public mini-app URL used in push notifications");
    println!("  PUSH_NOTIFICATIONS  Deliver notifications to mini-app push endpoints");
    println!("  PUSH_TIMEOUT_MS   Push request timeout (default: 3000)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
