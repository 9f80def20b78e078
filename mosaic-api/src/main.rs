use std::net::SocketAddr;
use std::sync::Arc;

use mosaic_api::{
    app,
    state::{AppState, WebhookConfig},
};
use mosaic_core::reservation::SystemClock;
use mosaic_store::checkout::CheckoutClient;
use mosaic_store::compress::PassthroughCompressor;
use mosaic_store::media::FsMediaStore;
use mosaic_store::square_repo::StoreSquareRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mosaic_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = mosaic_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Mosaic API on port {}", config.server.port);

    // Postgres connection + migrations
    let db = mosaic_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis connection
    let redis_client = mosaic_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis_arc = Arc::new(redis_client);

    let app_state = AppState {
        squares: Arc::new(StoreSquareRepository::new(db.pool.clone())),
        cache: redis_arc.clone(),
        media: Arc::new(FsMediaStore::new(&config.media.root)),
        payments: Arc::new(CheckoutClient::new(config.checkout.clone())),
        compressor: Arc::new(PassthroughCompressor),
        clock: Arc::new(SystemClock),
        redis: redis_arc,
        business_rules: config.business_rules.clone(),
        webhook: WebhookConfig {
            signing_secret: config.webhook.signing_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
