use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use promptrelay::api::{AppState, create_router};
use promptrelay::{CompletionRelay, Config, FailurePolicy, GeminiClient, TerminalSession};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "promptrelay", version)]
#[command(about = "Relay prompts from a terminal or HTTP client to a Gemini model")]
struct Cli {
    /// Environment file loaded before configuration is read
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// Model id, overrides RELAY_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    /// Per-request timeout in seconds, overrides RELAY_TIMEOUT_SECS (0 disables)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read one prompt per line from stdin and print each reply
    Chat {
        /// What to do after a failed exchange, overrides RELAY_ON_FAILURE
        #[arg(long, value_enum)]
        on_failure: Option<FailurePolicy>,
    },
    /// Serve `POST /chat` and static files
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Directory served at every path other than /chat
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.env_file.exists() {
        dotenv::from_path(&cli.env_file)?;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptrelay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.provider.model = model;
    }
    if let Some(secs) = cli.timeout_secs {
        config.provider.timeout = (secs > 0).then(|| std::time::Duration::from_secs(secs));
    }

    tracing::info!(model = %config.provider.model, "Initializing Gemini client...");
    let client = GeminiClient::new(config.gemini_config())?;
    let relay = CompletionRelay::new(Arc::new(client)).with_options(config.relay_options());

    match cli.command {
        Command::Chat { on_failure } => {
            let policy = on_failure.unwrap_or(config.terminal.on_failure);
            run_chat(relay, policy).await
        }
        Command::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(static_dir) = static_dir {
                config.server.static_dir = static_dir;
            }
            run_server(relay, &config).await
        }
    }
}

async fn run_chat(
    relay: CompletionRelay,
    policy: FailurePolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let session = TerminalSession::new(relay, policy).with_shutdown(shutdown);
    let summary = session
        .run(
            BufReader::new(tokio::io::stdin()),
            &mut tokio::io::stdout(),
            &mut tokio::io::stderr(),
        )
        .await?;

    tracing::debug!(?summary, "chat finished");
    Ok(())
}

async fn run_server(
    relay: CompletionRelay,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if !config.server.static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} does not exist - only /chat will answer",
            config.server.static_dir.display()
        );
    }

    let app = create_router(AppState::new(relay), &config.server.static_dir);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("promptrelay listening on http://{}", addr);
    tracing::info!("  Chat endpoint: POST http://{}/chat", addr);
    tracing::info!("  Static files:  {}", config.server.static_dir.display());

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
    token.cancel();
}
