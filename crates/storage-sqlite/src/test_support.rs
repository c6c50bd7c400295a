//! Temp-file databases for repository tests.

use std::sync::Arc;

use diesel::RunQueryDsl;
use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, get_connection, run_migrations, spawn_writer, DbPool, WriteHandle};

/// A migrated database in a temp directory. Keep `_dir` alive for the test.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

pub fn create_test_db() -> TestDb {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db").to_string_lossy().to_string();

    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());

    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}

impl TestDb {
    pub fn execute(&self, sql: &str) {
        let mut conn = get_connection(&self.pool).expect("Failed to get connection");
        diesel::sql_query(sql)
            .execute(&mut conn)
            .unwrap_or_else(|e| panic!("Failed to execute `{}`: {}", sql, e));
    }

    pub fn insert_donor(&self, id: &str, name: &str) {
        self.execute(&format!(
            "INSERT INTO donors (id, name) VALUES ('{}', '{}')",
            id, name
        ));
    }

    /// Inserts a campaign row directly, bypassing the repository.
    pub fn insert_campaign(&self, id: &str, status: &str, start: &str, end: Option<&str>) {
        let end = end.map_or("NULL".to_string(), |e| format!("'{}'", e));
        self.execute(&format!(
            "INSERT INTO campaigns (id, name, start_date, end_date, status, created_by, created_at, updated_at) \
             VALUES ('{}', 'Campaign {}', '{}', {}, '{}', 'staff-1', datetime('now'), datetime('now'))",
            id, id, start, end, status
        ));
    }
}
