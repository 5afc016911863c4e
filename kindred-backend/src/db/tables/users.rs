//! User records. Created at registration, never updated or deleted.

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::User;

impl Database {
    /// Insert a new user. The id is caller-chosen; a duplicate id fails
    /// on the primary key, which registration surfaces as "already
    /// exists" after its own lookup.
    pub fn create_user(&self, id: &str, name: &str, password: &str) -> SqliteResult<User> {
        let conn = self.conn();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO users (id, name, password, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, name, password, &created_at.to_rfc3339()],
        )?;

        Ok(User {
            id: id.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            created_at,
        })
    }

    pub fn get_user(&self, id: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, name, password, created_at FROM users WHERE id = ?1",
                [id],
                |row| Self::row_to_user(row),
            )
            .ok();
        Ok(user)
    }

    /// Seed the default `admin` user if it does not exist yet. Returns
    /// true when a row was created.
    pub fn seed_admin_user(&self, password: &str) -> SqliteResult<bool> {
        if self.get_user("admin")?.is_some() {
            return Ok(false);
        }
        self.create_user("admin", "admin", password)?;
        Ok(true)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            password: row.get(2)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn create_and_fetch_user() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.create_user("alice", "Alice", "hunter2").expect("create");

        let user = db.get_user("alice").expect("get").expect("exists");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.password, "hunter2");
        assert!(db.get_user("bob").expect("get").is_none());
    }

    #[test]
    fn duplicate_user_id_is_rejected() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.create_user("alice", "Alice", "pw").expect("create");
        assert!(db.create_user("alice", "Other", "pw2").is_err());
    }

    #[test]
    fn admin_seed_is_idempotent() {
        let db = Database::new(":memory:").expect("in-memory db");
        assert!(db.seed_admin_user("secret").expect("seed"));
        assert!(!db.seed_admin_user("other").expect("seed again"));
        // The original password wins
        let admin = db.get_user("admin").expect("get").expect("exists");
        assert_eq!(admin.password, "secret");
    }
}
