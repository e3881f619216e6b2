use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::uploads::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Upload backend. Default: LocalFileStore under UPLOAD_DIR. Swap via STORAGE_BACKEND.
    pub files: Arc<dyn FileStore>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State whose pool never connects; fine for routes that do not query.
    pub fn for_tests(files: Arc<dyn FileStore>, max_upload_bytes: usize) -> Self {
        use crate::config::StorageBackend;
        use sqlx::postgres::PgPoolOptions;

        let database_url = "postgres://localhost/candidates_test";
        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(database_url)
                .expect("lazy pool from a static url"),
            files,
            config: Config {
                database_url: database_url.to_string(),
                port: 0,
                rust_log: "debug".to_string(),
                upload_dir: "uploads".to_string(),
                max_upload_bytes,
                storage: StorageBackend::Local,
            },
        }
    }
}
