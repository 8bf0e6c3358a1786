use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tracing::{info, warn};

use guides_editor::EditorServices;
use guides_server::api::AppState;
use guides_server::auth::SessionManager;
use guides_server::config::GuidesConfig;

/// Guide editor HTTP server.
#[derive(Parser, Debug)]
#[command(name = "guides-server", about = "HTTP server for the guide edit page")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "guides.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the guides table for the configured record store, then exit.
    Migrate,
    /// Print a session token for a user, for use as the session cookie.
    IssueToken {
        /// User id placed in the token subject.
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_found = Path::new(&cli.config).exists();
    let config: GuidesConfig = if config_found {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    guides_server::telemetry::init(&config.logging);

    if !config_found {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    match cli.command {
        Some(Commands::Migrate) => return run_migrate(&config).await,
        Some(Commands::IssueToken { user }) => return run_issue_token(&config, &user),
        None => {}
    }

    let secret = config.auth.resolve_secret()?;
    let sessions = Arc::new(SessionManager::new(&secret, &config.auth));

    let guides = guides_server::store_factory::create_guide_store(&config.store).await?;
    info!(backend = %config.store.backend, "guide store initialized");
    let objects = guides_server::blob_factory::create_object_store(&config.storage).await?;
    info!(backend = %config.storage.backend, "object store initialized");

    let services = EditorServices::new(guides, objects)
        .with_limits(config.forms.limits())
        .with_max_concurrent_uploads(config.storage.max_concurrent_uploads);

    let state = AppState {
        services,
        sessions,
        max_body_bytes: config.server.max_body_bytes,
    };
    let app = guides_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "guides-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM, bounded by the
    // configured timeout once a signal arrives.
    let stopping = Arc::new(Notify::new());
    let signal = {
        let stopping = Arc::clone(&stopping);
        async move {
            shutdown_signal().await;
            stopping.notify_one();
        }
    };
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();

    tokio::select! {
        result = server => result?,
        () = async {
            stopping.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, dropping in-flight requests"
            );
        }
    }

    info!("guides-server shut down");
    Ok(())
}

/// Run the `migrate` subcommand: initialize the record store schema and exit.
async fn run_migrate(config: &GuidesConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.store.backend, "running record store migrations...");
    let _store = guides_server::store_factory::create_guide_store(&config.store).await?;
    info!(backend = %config.store.backend, "record store migrations complete");
    Ok(())
}

/// Run the `issue-token` subcommand: print a signed session token.
fn run_issue_token(config: &GuidesConfig, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let secret = config.auth.resolve_secret()?;
    let sessions = SessionManager::new(&secret, &config.auth);
    let token = sessions.issue(user)?;
    println!("{token}");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
