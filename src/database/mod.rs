//! The store adapter.
//!
//! `DbManager` owns the Postgres pool behind a readiness gate: the pool may still be
//! connecting (or may have failed to connect) when the first request arrives, so every
//! caller goes through [`DbManager::pool`], which waits a bounded amount of time for the
//! pool to become available.

pub mod subscribers;

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Connection, PgConnection, PgPool};
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::DbConfig;

#[derive(Clone, Debug)]
enum DbState {
    Pending,
    Ready(PgPool),
    Failed,
}

#[derive(Clone, Debug)]
pub struct DbManager {
    state: watch::Receiver<DbState>,
    ready_timeout: Duration,
}

impl DbManager {
    /// Creates the pool and waits for it before returning.
    pub async fn init(db_config: &DbConfig) -> Result<Self> {
        let db_pool = create_pool(db_config).await?;
        Ok(Self::from_pool(db_pool, db_config.pool.ready_timeout()))
    }

    /// Returns immediately and creates the pool on a separate task.
    /// Until that task finishes, requests wait on the gate for at most `ready_timeout_millis`.
    pub fn connect_in_background(db_config: &DbConfig) -> Self {
        let (tx, rx) = watch::channel(DbState::Pending);
        let ready_timeout = db_config.pool.ready_timeout();
        let db_config = db_config.clone();

        tokio::spawn(async move {
            let state = match create_pool(&db_config).await {
                Ok(db_pool) => DbState::Ready(db_pool),
                Err(er) => {
                    error!("{:<20} - {er}", "init_db");
                    DbState::Failed
                }
            };
            // Nobody is listening anymore if this fails.
            let _ = tx.send(state);
        });

        Self {
            state: rx,
            ready_timeout,
        }
    }

    /// A gate that is already open.
    pub fn from_pool(db_pool: PgPool, ready_timeout: Duration) -> Self {
        let (_tx, rx) = watch::channel(DbState::Ready(db_pool));
        Self {
            state: rx,
            ready_timeout,
        }
    }

    /// Waits for the pool to leave the pending state and returns a handle to it.
    pub async fn pool(&self) -> Result<PgPool> {
        let mut state = self.state.clone();

        let waited = tokio::time::timeout(
            self.ready_timeout,
            state.wait_for(|st| !matches!(st, DbState::Pending)),
        )
        .await;

        match waited {
            Ok(Ok(st)) => match &*st {
                DbState::Ready(db_pool) => Ok(db_pool.clone()),
                _ => Err(Error::Unavailable),
            },
            // The sender is gone while still pending.
            Ok(Err(_)) => Err(Error::Unavailable),
            Err(_) => Err(Error::ReadyTimeout(self.ready_timeout)),
        }
    }

    /// `true` once the pool exists.
    #[cfg(test)]
    fn is_ready(&self) -> bool {
        matches!(&*self.state.borrow(), DbState::Ready(_))
    }

    /// Closes the pool if it was ever created. Waits for checked-out connections to be returned.
    pub async fn close(&self) {
        let db_pool = match &*self.state.borrow() {
            DbState::Ready(db_pool) => db_pool.clone(),
            _ => return,
        };
        info!("{:<20} - Closing the DB pool", "close_db");
        db_pool.close().await;
    }

    /// Creates a fresh database with a random name, runs the migrations on it and
    /// returns an open gate to it. Used by the integration tests.
    pub async fn init_test_db(db_config: &DbConfig) -> Result<Self> {
        let db_config = DbConfig {
            db_name: Uuid::new_v4().to_string(),
            ..db_config.clone()
        };

        let mut connection =
            PgConnection::connect_with(&db_config.connection_options_without_db()).await?;
        let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name);
        sqlx::query(&sql).execute(&mut connection).await?;

        let dm = Self::init(&db_config).await?;
        sqlx::migrate!("./migrations").run(&dm.pool().await?).await?;

        Ok(dm)
    }
}

async fn create_pool(db_config: &DbConfig) -> Result<PgPool> {
    info!("{:<20} - Initializing the DB pool", "init_db");

    let db_pool = PgPoolOptions::new()
        .max_connections(db_config.pool.max_connections)
        .acquire_timeout(db_config.pool.acquire_timeout())
        .connect_with(db_config.connection_options())
        .await
        .map_err(Error::FailToCreatePool)?;

    info!("{:<20} - DB pool ready", "init_db");
    Ok(db_pool)
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(#[source] sqlx::Error),
    #[error("db pool is not available")]
    Unavailable,
    #[error("db pool was not ready after {0:?}")]
    ReadyTimeout(Duration),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}
