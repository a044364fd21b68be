//! Agora - social content service backend
//! Mission: Serve users, posts, comments, and votes behind bearer-token auth

use agora_backend::api::{self, AppState};
use agora_backend::auth::HashStrategy;
use agora_backend::service::{AppService, ServiceConfig};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "agora", about = "Social content service backend")]
struct Args {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH")]
    database_path: String,

    /// Secret used to sign bearer tokens
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: String,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3001")]
    listen_addr: String,

    /// Hashing strategy for new credentials
    #[arg(long, env = "HASH_STRATEGY", default_value = "bcrypt")]
    hash_strategy: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("agora_backend=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing database path or secret fails right here, before anything binds.
    let args = Args::parse();
    let hash_strategy = HashStrategy::from_name(&args.hash_strategy)
        .ok_or_else(|| anyhow!("unknown hash strategy: {}", args.hash_strategy))?;

    let service = AppService::init(&ServiceConfig {
        database_path: args.database_path,
        signing_secret: args.jwt_secret,
        hash_strategy,
    })?;

    let app = api::router(AppState::from_service(&service));
    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!("🚀 listening on {}", args.listen_addr);

    axum::serve(listener, app).await.context("server error")?;

    service.shutdown();
    Ok(())
}
