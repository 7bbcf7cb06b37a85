use std::net::SocketAddr;
use std::sync::Arc;

use api_server::http::{self, AppState};
use shared::config::{ApiConfig, ConfigError, DEFAULT_BIND_ADDR, ModelClientConfig};
use shared::diagnosis::DiagnosisService;
use shared::llm::{ChatCompletionsGateway, LlmGateway};
use shared::sessions::SessionStore;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("failed to load .env file: {err}");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_server=debug,shared=info,axum=info".to_string()),
        )
        .init();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let gateway: Option<Arc<dyn LlmGateway>> = match ModelClientConfig::from_env() {
        Ok(model_config) => match ChatCompletionsGateway::new(model_config) {
            Ok(gateway) => {
                info!(model = gateway.model(), "diagnosis model client configured");
                Some(Arc::new(gateway))
            }
            Err(err) => {
                error!("failed to build diagnosis model client: {err}");
                std::process::exit(1);
            }
        },
        Err(ConfigError::MissingVar(key)) => {
            error!("{key} is not set; analysis requests will be rejected until it is configured");
            None
        }
        Err(err) => {
            error!("failed to read model client config: {err}");
            std::process::exit(1);
        }
    };

    let sessions = SessionStore::new(config.session_ttl());
    let _sweeper = sessions.spawn_sweeper(config.session_sweep_interval());

    let app = http::build_router(AppState {
        diagnosis: DiagnosisService::new(sessions, gateway),
    });

    let addr: SocketAddr = config.bind_addr.parse().unwrap_or_else(|_| {
        warn!(
            bind_addr = config.bind_addr.as_str(),
            "invalid bind address, falling back to default"
        );
        DEFAULT_BIND_ADDR
            .parse()
            .expect("valid default bind addr")
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind should succeed");

    info!(
        "symptom intake api listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server should run");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
