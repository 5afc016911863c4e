//! Avatar image blobs

use chrono::Utc;
use rusqlite::Result as SqliteResult;

use super::super::Database;

impl Database {
    pub fn add_avatar(&self, id: &str, mime_type: &str, data: &[u8]) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO avatars (id, mime_type, data, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, mime_type, data, &Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Fetch an avatar as (mime_type, bytes)
    pub fn get_avatar(&self, id: &str) -> SqliteResult<Option<(String, Vec<u8>)>> {
        let conn = self.conn();
        let avatar = conn
            .query_row(
                "SELECT mime_type, data FROM avatars WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .ok();
        Ok(avatar)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn avatar_round_trip() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.add_avatar("av1", "image/png", &[137, 80, 78, 71]).expect("add");

        let (mime, data) = db.get_avatar("av1").expect("get").expect("exists");
        assert_eq!(mime, "image/png");
        assert_eq!(data, vec![137, 80, 78, 71]);
        assert!(db.get_avatar("missing").expect("get").is_none());
    }
}
