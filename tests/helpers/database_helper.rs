//! Test database helper utilities

use std::sync::Once;
use tempfile::TempDir;
use LinguaRelay::database::{create_pool, run_migrations, DatabaseConfig, DatabasePool, DatabaseService};

static INIT: Once = Once::new();

/// A migrated SQLite database living in a temporary directory
pub struct TestDatabase {
    pub pool: DatabasePool,
    pub service: DatabaseService,
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Self {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        });

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("relay.db").display()),
            ..DatabaseConfig::default()
        };
        let pool = create_pool(&config).await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        Self {
            service: DatabaseService::new(pool.clone()),
            pool,
            _dir: dir,
        }
    }
}
