//! Store session: the explicitly constructed handle every component uses.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::{
    MemoryOrderLog, MemoryPreferenceIndex, MemorySummaryStore, OrderLog, PreferenceIndex,
    SummaryStore,
};
use crate::config::{StorageConfig, StorageType};
use crate::error::{Result, RollupError};

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resources the session owns and must release on close.
enum Backend {
    /// Stores supplied by the caller; nothing to release.
    Unmanaged,
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::SqlitePool),
}

/// Handle to the three tables plus the per-call limits.
///
/// Owned by the process driver and passed by reference into each
/// component. Call [`Session::close`] once the run has finished.
pub struct Session {
    pub orders: Arc<dyn OrderLog>,
    pub summaries: Arc<dyn SummaryStore>,
    pub preferences: Arc<dyn PreferenceIndex>,
    page_size: usize,
    timeout: Duration,
    backend: Backend,
}

impl Session {
    /// Session over caller-supplied stores. Closing it releases nothing;
    /// the caller owns whatever backs the stores.
    pub fn new(
        orders: Arc<dyn OrderLog>,
        summaries: Arc<dyn SummaryStore>,
        preferences: Arc<dyn PreferenceIndex>,
    ) -> Self {
        Self {
            orders,
            summaries,
            preferences,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            backend: Backend::Unmanaged,
        }
    }

    /// Session over in-memory stores the caller keeps handles to.
    pub fn in_memory(
        orders: Arc<MemoryOrderLog>,
        summaries: Arc<MemorySummaryStore>,
        preferences: Arc<MemoryPreferenceIndex>,
    ) -> Self {
        Self::new(orders, summaries, preferences)
    }

    /// Session over a SQLite pool. Creates the tables if missing.
    #[cfg(feature = "sqlite")]
    pub async fn sqlite(pool: sqlx::SqlitePool) -> super::Result<Self> {
        use super::sqlite::{init_schema, SqliteOrderLog, SqlitePreferenceIndex, SqliteSummaryStore};

        init_schema(&pool).await?;

        let mut session = Self::new(
            Arc::new(SqliteOrderLog::new(pool.clone())),
            Arc::new(SqliteSummaryStore::new(pool.clone())),
            Arc::new(SqlitePreferenceIndex::new(pool.clone())),
        );
        session.backend = Backend::Sqlite(pool);
        Ok(session)
    }

    pub fn with_limits(mut self, page_size: usize, timeout: Duration) -> Self {
        self.page_size = page_size;
        self.timeout = timeout;
        self
    }

    /// Maximum rows per page fetch.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Deadline for each store call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether [`Session::close`] releases a connection pool.
    pub fn owns_pool(&self) -> bool {
        !matches!(self.backend, Backend::Unmanaged)
    }

    /// Release the underlying connections.
    pub async fn close(self) {
        match self.backend {
            Backend::Unmanaged => {}
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(pool) => pool.close().await,
        }
    }
}

/// Establish a session based on configuration.
///
/// Failure to open or initialize the store is a [`RollupError::Connection`].
pub async fn connect(config: &StorageConfig) -> Result<Session> {
    let session = match config.storage_type {
        StorageType::Memory => {
            info!("Storage: memory");
            Session::in_memory(
                Arc::new(MemoryOrderLog::new()),
                Arc::new(MemorySummaryStore::new()),
                Arc::new(MemoryPreferenceIndex::new()),
            )
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            info!("Storage: sqlite at {}", config.sqlite.path);
            let open = async {
                let pool = super::sqlite::open_pool(&config.sqlite.path).await?;
                Session::sqlite(pool).await
            };
            super::helpers::within(config.timeout(), "connect", open)
                .await
                .map_err(RollupError::Connection)?
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            return Err(RollupError::Connection(super::StorageError::BackendDisabled(
                config.storage_type.as_str(),
            )));
        }
    };

    Ok(session.with_limits(config.page_size, config.timeout()))
}
