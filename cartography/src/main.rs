use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartography::api::{create_router, AppState};
use cartography::config::Config;
use cartography::hub::HubClient;
use cartography::ingest::UserAssembler;
use cartography::services::BuildPipeline;
use cartography::snapshot::SnapshotEngine;
use cartography::store::{BlobStore, LocalBlobStore};

#[derive(Parser)]
#[command(name = "cartography")]
#[command(about = "Time-ordered interaction graphs around a set of Farcaster users")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, assemble and store the graph for a set of core users
    Build {
        /// Comma-separated core user ids
        #[arg(long, value_delimiter = ',', required = true)]
        fids: Vec<String>,
        /// Keep this many non-core nodes (defaults to CARTOGRAPHY_TOP_N)
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Print the snapshot of a stored graph as JSON
    Snapshot {
        /// Graph key printed by `build`
        #[arg(long)]
        graph: String,
        /// Slider position in [0, 100]
        #[arg(long, conflicts_with = "cursor")]
        position: Option<f64>,
        /// Absolute cursor in network seconds
        #[arg(long)]
        cursor: Option<i64>,
        /// Highlight shortest paths from this node to the core nodes
        #[arg(long)]
        selected: Option<String>,
    },
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartography=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    if config.hub.api_key.is_none() {
        tracing::warn!("NEYNAR_API_KEY is not set - hub requests are sent unauthenticated");
    }

    let cancel_token = CancellationToken::new();
    let pipeline = build_pipeline(&config, cancel_token.child_token())?;

    match args.command {
        Command::Build { fids, top_n } => {
            tokio::spawn(shutdown_signal(cancel_token.clone()));

            let (_, report) = pipeline.build(&fids, top_n).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Snapshot {
            graph,
            position,
            cursor,
            selected,
        } => {
            let context = pipeline.load(&graph).await?;
            let cursor = match (cursor, position) {
                (Some(cursor), _) => cursor,
                (None, Some(position)) => context.cursor_at(position),
                (None, None) => context.max_timestamp,
            };

            let engine = SnapshotEngine::new(config.visual.clone());
            let snapshot = engine.materialize(&context, cursor, selected.as_deref());
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Serve => serve(config, pipeline, cancel_token).await?,
    }

    Ok(())
}

fn build_pipeline(config: &Config, cancel: CancellationToken) -> anyhow::Result<BuildPipeline> {
    let hub = HubClient::new(config.hub.clone())?.with_cancellation(cancel);
    let store: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.store.data_dir));

    tracing::info!("Storing records under {}", config.store.data_dir);
    Ok(BuildPipeline::new(
        UserAssembler::new(hub),
        store,
        &config.store,
        &config.graph,
    ))
}

async fn serve(
    config: Config,
    pipeline: BuildPipeline,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(AppState::new(config, pipeline));

    tracing::info!("Cartography starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling in-flight hub requests...");
    cancel_token.cancel();
}
