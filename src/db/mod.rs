//! Database module
//!
//! Handles SQLite connection and migrations.

pub mod connection;
pub mod migrations;

use std::path::PathBuf;

pub use connection::{Database, DbError, DbResult};

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "CICO_DATABASE_PATH";

/// Database path from `CICO_DATABASE_PATH`, or `<project>/data/cico.db`
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("cico.db");
            path
        })
}

/// Open the database at `path`, creating its directory, and migrate it
pub fn open(path: &std::path::Path) -> Result<Database, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let database = Database::new(path)?;
    database.with_conn(migrations::run_migrations)?;
    Ok(database)
}

/// Open an in-memory database with the current schema applied
#[cfg(test)]
pub fn test_database() -> Database {
    let db = Database::in_memory().expect("in-memory database");
    db.with_conn(migrations::run_migrations)
        .expect("migrations");
    db
}
