use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use freemarket_backend::{
    AppState,
    config::Config,
    database::{self, PgLikeRepository, PgMessageRepository, PgProductRepository, PgUserRepository},
    infrastructure::{GeminiClient, TokenService},
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Loaded once; the signing secret only ever comes from here.
    let config = Config::from_env().expect("Failed to load configuration");

    let pool = database::connect(&config)
        .await
        .expect("Failed to connect to Postgres");

    if config.gemini.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set, product summaries will fail");
    }

    let state = AppState {
        tokens: TokenService::from_config(&config),
        bcrypt_cost: config.bcrypt_cost,
        users: Arc::new(PgUserRepository::new(pool.clone())),
        products: Arc::new(PgProductRepository::new(pool.clone())),
        likes: Arc::new(PgLikeRepository::new(pool.clone())),
        messages: Arc::new(PgMessageRepository::new(pool)),
        text_generator: Arc::new(GeminiClient::new(&config.gemini)),
    };

    let app = create_router(state, config.cors.clone());

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid SERVER_HOST, falling back to dual-stack default");
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
