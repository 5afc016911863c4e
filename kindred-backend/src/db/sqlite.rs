//! SQLite-backed storage shared by all request handlers.
//!
//! One `Database` is created at startup and handed to `AppState`; the
//! per-table operations live in `db/tables/*` as `impl Database`
//! extension blocks.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result as SqliteResult;
use std::path::Path;

pub type DbConn = PooledConnection<SqliteConnectionManager>;

pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema
    /// exists. `":memory:"` opens a private in-memory database; its
    /// pool is capped at one connection so every caller sees the same
    /// data (each in-memory connection is otherwise its own database).
    pub fn new(path: &str) -> SqliteResult<Self> {
        let (manager, max_size) = if path == ":memory:" {
            (SqliteConnectionManager::memory(), 1)
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    let _ = std::fs::create_dir_all(parent);
                }
            }
            (SqliteConnectionManager::file(path), 8)
        };

        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .expect("Failed to build database connection pool");

        let db = Database { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Get a pooled connection. Panics if the pool stays exhausted past
    /// the acquire timeout.
    pub fn conn(&self) -> DbConn {
        self.pool
            .get()
            .expect("Failed to acquire database connection")
    }

    fn init_schema(&self) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS auth_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS roles (
                id TEXT PRIMARY KEY,
                belongs_to TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                avatar TEXT NOT NULL,
                background TEXT NOT NULL,
                voice_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_roles_owner ON roles(belongs_to);

            CREATE TABLE IF NOT EXISTS threads (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                role_id TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_threads_owner ON threads(user_id);

            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                thread_id TEXT NOT NULL,
                sender TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id);

            CREATE TABLE IF NOT EXISTS knowledge (
                id TEXT PRIMARY KEY,
                role_id TEXT NOT NULL,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_knowledge_role ON knowledge(role_id);

            CREATE TABLE IF NOT EXISTS voices (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                size INTEGER NOT NULL,
                data BLOB NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_voices_owner ON voices(user_id);

            CREATE TABLE IF NOT EXISTS avatars (
                id TEXT PRIMARY KEY,
                mime_type TEXT NOT NULL,
                data BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS shared_notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_database_has_schema() {
        let db = Database::new(":memory:").expect("in-memory db");
        let conn = db.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
                [],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        assert_eq!(count, 1);
    }

    #[test]
    fn file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/kindred.db");
        let db = Database::new(path.to_str().expect("utf-8 path")).expect("file db");
        drop(db);
        assert!(path.exists());
    }
}
