mod shutdown;

// re-export
pub use shutdown::shutdown_signal;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::AppConfig, database::DbManager, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Binds the listener right away and starts creating the DB pool in the background,
    /// so the server comes up even while the database is still unreachable.
    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let dm = DbManager::connect_in_background(&config.db_config);
        let app_state = AppState::new(dm, config.static_config.dir.clone());

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub database_mgr: DbManager,
    pub static_dir: PathBuf,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(database_mgr: DbManager, static_dir: PathBuf) -> Self {
        AppState(Arc::new(InternalState {
            database_mgr,
            static_dir,
        }))
    }
}
