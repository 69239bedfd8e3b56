use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use axum::{http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use storefront_backend::{
    config::Config,
    db::{memory_db::MemoryDb, Database},
    responses::JsonResponse,
    routes,
    services::smtp_mailer::{LogMailer, Mailer, SmtpMailer},
    AppState,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let json = std::env::var("LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;

    let db = match &config.database_url {
        Some(url) => {
            let pool = establish_connection(url).await?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            Database::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
            Database::in_memory(Arc::new(MemoryDb::new()))
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(
            SmtpMailer::new(smtp, &config.store_name).context("failed to initialize mailer")?,
        ),
        None => {
            warn!("SMTP_HOST not set; activation emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let global_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit.per_second)
            .burst_size(config.rate_limit.burst)
            .use_headers()
            .finish()
            .ok_or_else(|| anyhow!("rate limiter settings must be positive"))?,
    );

    // Background task to cleanup old IPs
    let governor_limiter = global_governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, db, mailer).context("invalid JWT secrets")?;

    let app = routes::router(state).layer(
        GovernorLayer::new(global_governor_conf).error_handler(|_err| {
            JsonResponse::error(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please wait a moment and try again.",
                Vec::new(),
            )
            .into_response()
        }),
    );

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "storefront backend listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    info!("connected to the database");
    Ok(pool)
}
