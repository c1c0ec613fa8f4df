use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = folio_api::config::config();
    tracing::info!("starting folio-api in {:?} mode", config.environment);

    if config.is_production() && config.security.jwt_secret.is_empty() {
        panic!("JWT_SECRET must be set in production");
    }

    let pool = folio_api::store::connect(config)
        .await
        .unwrap_or_else(|e| panic!("database connection failed: {}", e));
    folio_api::store::migrate(&pool)
        .await
        .expect("schema migration failed");
    folio_api::store::users::seed_admin(&pool, &config.security)
        .await
        .expect("admin seeding failed");

    let state = folio_api::AppState::new(pool, config);
    let app = folio_api::app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("FOLIO_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("folio-api listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}
