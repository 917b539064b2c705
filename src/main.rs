mod analysis;
mod email;
mod error;
mod routes;
mod server_config;
mod state;

use std::{env, net::SocketAddr, sync::Arc};

use analysis::analyzer::EmailAnalyzer;
use mimalloc::MiMalloc;
use routes::AppRouter;
use state::credential_store::{CredentialStore, InMemoryCredentialStore};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub type HttpClient = reqwest::Client;

#[derive(Clone)]
pub struct ServerState {
    pub http_client: HttpClient,
    pub analyzer: Arc<EmailAnalyzer>,
    pub credentials: Arc<dyn CredentialStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    let http_client = reqwest::ClientBuilder::new().use_rustls_tls().build()?;

    let analyzer = EmailAnalyzer::from_config(
        http_client.clone(),
        &server_config::cfg.providers,
        &server_config::cfg.model,
    );

    let state = ServerState {
        http_client,
        analyzer: Arc::new(analyzer),
        credentials: Arc::new(InMemoryCredentialStore::new()),
    };

    let router = AppRouter::create(state);

    let port = env::var("PORT").unwrap_or("5006".to_string());
    tracing::info!("Mailsense server running on http://0.0.0.0:{}", port);
    tracing::info!("{}", *server_config::cfg);

    let addr = SocketAddr::from(([0, 0, 0, 0], port.parse::<u16>()?));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Shutting down");
        },
        _ = terminate => {
            tracing::info!("Shutting down");
        },
    }
}
