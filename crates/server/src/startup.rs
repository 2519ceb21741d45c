use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use chrono::Duration;
use configs::{AppConfig, AuthSettings, EmailConfig, EmailProvider};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::email::{EmailSender, HttpEmailSender, LogEmailSender};

use crate::auth::ServerState;
use crate::errors::StartupError;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

pub fn auth_config(settings: &AuthSettings) -> AuthConfig {
    AuthConfig {
        jwt_secret: settings.jwt_secret.clone(),
        token_ttl: Duration::hours(settings.token_ttl_hours),
        otp_ttl: Duration::minutes(settings.otp_ttl_minutes),
        otp_digits: settings.otp_digits,
    }
}

/// Pick the outbound mail transport from the `[email]` section.
pub fn build_email_sender(cfg: &EmailConfig) -> Result<Arc<dyn EmailSender>, StartupError> {
    match cfg.provider {
        EmailProvider::Log => Ok(Arc::new(LogEmailSender)),
        EmailProvider::Http => {
            let url = cfg
                .api_url
                .clone()
                .ok_or_else(|| StartupError::Email("email.api_url is required for the http provider".into()))?;
            Ok(Arc::new(HttpEmailSender::new(url, cfg.api_key.clone(), cfg.from.clone())))
        }
    }
}

/// Wire the auth service over any repository and mail transport.
pub fn build_state(repo: Arc<dyn AuthRepository>, mailer: Arc<dyn EmailSender>, cfg: AuthConfig) -> ServerState {
    ServerState { auth: Arc::new(AuthService::new(repo, mailer, cfg)) }
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: load config, open the pool, build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(format!("{e:#}")))?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db });
    let mailer = build_email_sender(&cfg.email)?;
    let state = build_state(repo, mailer, auth_config(&cfg.auth));

    let app = build_app(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, email_provider = ?cfg.email.provider, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
