//! Teamboard server entry point.

use anyhow::{Context, bail};
use clap::Parser;
use mockable::DefaultClock;
use std::sync::Arc;
use teamboard::config::{Command, Settings};
use teamboard::persistence::{InMemoryStore, PgPool, PostgresStore, TrackerStore, apply_schema, connect};
use teamboard::web::{self, AppState};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let settings = Settings::parse();
    teamboard::telemetry::init(settings.log_format).context("installing the log subscriber")?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "ignoring unreadable environment file"),
    }

    match settings.command() {
        Command::Migrate => migrate(&settings).await,
        Command::Serve => serve(settings).await,
    }
}

async fn migrate(settings: &Settings) -> anyhow::Result<()> {
    let Some(url) = settings.database_url.clone() else {
        bail!("DATABASE_URL must be set to migrate");
    };
    open_pool(url, settings.database_pool_size).await?;
    info!("database schema is up to date");
    Ok(())
}

async fn open_pool(url: String, size: u32) -> anyhow::Result<PgPool> {
    let pool = tokio::task::spawn_blocking(move || connect(&url, size))
        .await
        .context("joining the connection task")?
        .context("connecting to the database")?;
    apply_schema(&pool).await.context("applying the schema")?;
    Ok(pool)
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let store: Arc<dyn TrackerStore> = match settings.database_url.clone() {
        Some(url) => Arc::new(PostgresStore::new(
            open_pool(url, settings.database_pool_size).await?,
        )),
        None => {
            warn!("DATABASE_URL is not set; data will be kept in memory only");
            Arc::new(InMemoryStore::new())
        }
    };

    let state = Arc::new(
        AppState::new(store, Arc::new(DefaultClock), web::WebConfig::from_settings(&settings))
            .context("loading templates")?,
    );

    if let Some(account) = &settings.superuser {
        let admin = state
            .workers()
            .ensure_superuser(&account.username, &account.email, &account.password)
            .await
            .context("ensuring the bootstrap superuser")?;
        info!(worker_id = %admin.id(), "bootstrap superuser ready");
    }

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "could not listen for ctrl-c; shutting down");
    }
}
