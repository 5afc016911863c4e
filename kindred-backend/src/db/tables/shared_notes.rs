//! Global shared note list feeding the demo generation endpoint.
//!
//! Unlike role knowledge these are not tied to any role or user.

use chrono::Utc;
use rusqlite::Result as SqliteResult;

use super::super::Database;

impl Database {
    /// Append notes in order. Returns how many were stored.
    pub fn append_shared_notes(&self, contents: &[String]) -> SqliteResult<usize> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        for content in contents {
            conn.execute(
                "INSERT INTO shared_notes (content, created_at) VALUES (?1, ?2)",
                [content.as_str(), now.as_str()],
            )?;
        }
        Ok(contents.len())
    }

    /// All notes in insertion order
    pub fn list_shared_notes(&self) -> SqliteResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT content FROM shared_notes ORDER BY id ASC")?;

        let notes = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn notes_accumulate_in_insertion_order() {
        let db = Database::new(":memory:").expect("in-memory db");
        assert!(db.list_shared_notes().expect("list").is_empty());

        db.append_shared_notes(&["first".to_string()]).expect("append");
        db.append_shared_notes(&["second".to_string(), "third".to_string()])
            .expect("append");

        assert_eq!(
            db.list_shared_notes().expect("list"),
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }
}
