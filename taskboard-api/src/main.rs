//! # Taskboard API Server
//!
//! HTTP server for the Taskboard project/task tracker. Serves project and
//! task CRUD, membership management, the task status/progress lifecycle,
//! and JWT-based authentication.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p taskboard-api
//! ```

use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::db::{migrations::run_migrations, pool::create_pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.database.pool_config()).await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
