//! taskhub server: load settings, prepare the database, serve the API.
//!
//! Run from repo root: `cargo run -p taskhub-server`

use taskhub::{
    apply_migrations, build_app, connect, ensure_database_exists, entities, resolve, AppState,
    ServiceRegistry, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("taskhub=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings).await?;

    let tables = resolve(&entities::tables())?;
    apply_migrations(&pool, &tables).await?;
    let registry = ServiceRegistry::postgres(tables, pool.clone())?;

    let state = AppState {
        pool,
        registry: Arc::new(registry),
        auth: Arc::new(settings.auth.clone()),
    };
    let app = build_app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("taskhub listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
