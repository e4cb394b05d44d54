//! Headless API server entrypoint.

use burnpaste_core::store::open_store;
use burnpaste_server::purge::{run_pass, PurgeTask};
use burnpaste_server::{serve_router, AppState, Config, PasteService, DEFAULT_PORT};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    purge: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--purge" => flags.purge = true,
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "burnpaste=info,tower_http=warn".into()),
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
    let store = open_store(&config)?;
    let service = PasteService::new(store).with_max_paste_size(config.max_paste_size);

    if cli_flags.purge {
        let purged = run_pass(Arc::new(service)).await;
        println!("Purged {} expired paste(s)", purged);
        return Ok(());
    }

    if config.test_mode {
        tracing::warn!(
            "TEST_MODE enabled - clients can override the clock with the x-test-now-ms header"
        );
    }

    let bind_addr = config.bind_addr();
    let purge_interval = config.purge_interval_secs;
    let state = AppState::new(config, service);

    let purge_task = (purge_interval > 0).then(|| {
        PurgeTask::spawn(state.service.clone(), Duration::from_secs(purge_interval))
    });

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("burnpaste running at http://{}", actual_addr);

    let serve_result = serve_router(listener, state, shutdown_signal()).await;

    if let Some(task) = purge_task {
        task.shutdown().await;
    }
    tracing::info!("Server stopped");

    serve_result?;

    Ok(())
}

fn print_help() {
    println!("burnpaste - self-destructing paste server\n");
    println!("Usage: burnpaste [OPTIONS]\n");
    println!("Options:");
    println!("  --purge           Reclaim expired pastes once and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory, or :memory: (default: ~/.cache/burnpaste/db)");
    println!("  HOST              Bind address (default: 0.0.0.0)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  MAX_PASTE_SIZE    Maximum paste size in bytes (default: 1MB)");
    println!("  PURGE_INTERVAL_SECS  Seconds between purge passes, 0 disables (default: 60)");
    println!("  PUBLIC_BASE_URL   Base for returned paste URLs (default: request Host)");
    println!("  TEST_MODE         Honour the x-test-now-ms header (never enable in production)");
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
    tracing::info!("Shutdown signal received");
}
