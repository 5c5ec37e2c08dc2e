//! Shared state for the API router.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::llm::TextGenerator;

/// Shared context for all API routes.
///
/// SQLite connections are not `Sync`, so the single connection sits behind
/// a mutex and is only touched from the blocking pool.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
    generator: Arc<dyn TextGenerator>,
}

impl ApiContext {
    pub fn new(conn: Connection, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            generator,
        }
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        Arc::clone(&self.generator)
    }

    /// Run `f` against the database on the blocking pool.
    pub async fn with_db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".into()))?;
            f(&conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
    }

    /// Run `f` against the generator on the blocking pool, without holding
    /// the database lock.
    pub async fn with_generator<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn TextGenerator) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let generator = self.generator();
        tokio::task::spawn_blocking(move || f(generator.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
    }
}
