use std::sync::Arc;

use tick_store::{PartitionIndex, QueryEngine};
use types::errors::QueryError;

use crate::audit::RegistrationLog;
use crate::config::GatewayConfig;
use crate::error::AppError;
use crate::keystore::{FileKeyStore, KeyStore};

#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<dyn KeyStore>,
    pub engine: Arc<QueryEngine>,
}

impl AppState {
    pub fn new(keys: Arc<dyn KeyStore>, engine: QueryEngine) -> Self {
        Self {
            keys,
            engine: Arc::new(engine),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        let keys = FileKeyStore::load(
            config.api_keys.iter().cloned(),
            config.admin_key.clone(),
            config.api_keys_file.clone(),
            RegistrationLog::new(config.registrations_file.clone()),
        );

        let mut index = PartitionIndex::new(config.data_dir.clone());
        if let Some(years) = &config.archive_years {
            index = index.with_years(years.iter().copied());
        }

        Self::new(Arc::new(keys), QueryEngine::from_index(index))
    }

    /// Run a key-store operation off the async workers.
    pub async fn with_keys<T, E, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        E: Into<AppError> + Send + 'static,
        F: FnOnce(&dyn KeyStore) -> Result<T, E> + Send + 'static,
    {
        let keys = Arc::clone(&self.keys);
        tokio::task::spawn_blocking(move || f(keys.as_ref()))
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("key store task failed: {}", e)))?
            .map_err(Into::into)
    }

    /// Run a query off the async workers; partition reads are blocking I/O.
    pub async fn with_engine<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&QueryEngine) -> Result<T, QueryError> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("query task failed: {}", e)))?
            .map_err(AppError::from)
    }
}
