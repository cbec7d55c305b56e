use crate::server::ServerState;
use cwksocial_application::build_mediator;
use cwksocial_common::{
    model::auth::{TokenService, TokenSettings},
    util::{NonPositiveDurationError, PositiveDuration},
};
use cwksocial_db::{client::DbClient, memory::MemoryStore, store::DbError};
use serde::Deserialize;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("JWT_LIFETIME_SECONDS is invalid: {0}")]
    TokenLifetime(#[from] NonPositiveDurationError),
    #[error("Error setting up the database: {0}")]
    Database(#[from] DbError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_jwt_claim() -> String {
    "cwksocial".to_owned()
}

fn default_jwt_lifetime_seconds() -> i64 {
    7200
}

#[derive(Clone, Eq, PartialEq, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: Option<String>,
    #[serde(default = "default_database_max_connections")]
    database_max_connections: u32,
    jwt_signing_key: String,
    #[serde(default = "default_jwt_claim")]
    jwt_issuer: String,
    #[serde(default = "default_jwt_claim")]
    jwt_audience: String,
    #[serde(default = "default_jwt_lifetime_seconds")]
    jwt_lifetime_seconds: i64,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cwksocial_api=debug,\
                cwksocial_application=debug,\
                cwksocial_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

async fn server_state(env: &Env) -> Result<ServerState, InitError> {
    let tokens = Arc::new(TokenService::new(&TokenSettings {
        signing_key: env.jwt_signing_key.clone(),
        issuer: env.jwt_issuer.clone(),
        audience: env.jwt_audience.clone(),
        lifetime: PositiveDuration::from_seconds(env.jwt_lifetime_seconds)?,
    }));

    let mediator = if let Some(database_url) = &env.database_url {
        let client = DbClient::connect(database_url, env.database_max_connections).await?;
        client.migrate().await?;
        info!("Connected to database and applied migrations");

        build_mediator(&Arc::new(client), &tokens)
    } else {
        warn!("DATABASE_URL is not set, all data is kept in memory and lost on shutdown");
        build_mediator(&Arc::new(MemoryStore::new()), &tokens)
    };

    Ok(ServerState {
        mediator: Arc::new(mediator),
        tokens,
    })
}

fn shutdown_on_ctrl_c() -> CancellationToken {
    let shutdown = CancellationToken::new();

    let token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Could not listen for ctrl-c");
            return;
        }
        info!("Received ctrl-c, shutting down");
        token.cancel();
    });

    shutdown
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;
    let state = server_state(&env).await?;

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().layer(tracing_layer).with_state(state);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on_ctrl_c().cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
