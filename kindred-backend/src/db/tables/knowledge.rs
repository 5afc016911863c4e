//! Per-role knowledge ("memories") used to ground persona replies

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use super::super::Database;
use crate::models::{Knowledge, KnowledgeKind};

impl Database {
    /// Add a memory snippet to a role. An omitted name is defaulted to
    /// a timestamped label.
    pub fn add_knowledge(
        &self,
        role_id: &str,
        content: &str,
        name: Option<&str>,
        kind: KnowledgeKind,
    ) -> SqliteResult<Knowledge> {
        let conn = self.conn();
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let name = name
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("Memory #{}", now.timestamp_millis()));

        conn.execute(
            "INSERT INTO knowledge (id, role_id, name, content, kind, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            rusqlite::params![
                &id,
                role_id,
                &name,
                content,
                kind.as_str(),
                &now.to_rfc3339(),
            ],
        )?;

        Ok(Knowledge {
            id,
            role_id: role_id.to_string(),
            name,
            content: content.to_string(),
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_knowledge(&self, id: &str) -> SqliteResult<Option<Knowledge>> {
        let conn = self.conn();
        let knowledge = conn
            .query_row(
                "SELECT id, role_id, name, content, kind, created_at, updated_at
                 FROM knowledge WHERE id = ?1",
                [id],
                |row| Self::row_to_knowledge(row),
            )
            .ok();
        Ok(knowledge)
    }

    /// List a role's knowledge, newest first
    pub fn list_role_knowledge(&self, role_id: &str) -> SqliteResult<Vec<Knowledge>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, role_id, name, content, kind, created_at, updated_at
             FROM knowledge WHERE role_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;

        let entries = stmt
            .query_map([role_id], |row| Self::row_to_knowledge(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    pub fn count_role_knowledge(&self, role_id: &str) -> SqliteResult<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM knowledge WHERE role_id = ?1",
            [role_id],
            |row| row.get(0),
        )
    }

    /// Contents only, newest first, for prompt assembly
    pub fn role_knowledge_texts(&self, role_id: &str) -> SqliteResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT content FROM knowledge WHERE role_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;

        let texts = stmt
            .query_map([role_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(texts)
    }

    /// Update content (and optionally the name) of an entry, bumping
    /// updated_at. Returns None when the entry does not exist.
    pub fn update_knowledge(
        &self,
        id: &str,
        content: &str,
        name: Option<&str>,
    ) -> SqliteResult<Option<Knowledge>> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let rows_affected = match name {
            Some(name) => conn.execute(
                "UPDATE knowledge SET content = ?1, name = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![content, name, &now, id],
            )?,
            None => conn.execute(
                "UPDATE knowledge SET content = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![content, &now, id],
            )?,
        };

        if rows_affected == 0 {
            return Ok(None);
        }
        drop(conn);
        self.get_knowledge(id)
    }

    pub fn delete_knowledge(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute("DELETE FROM knowledge WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    fn row_to_knowledge(row: &rusqlite::Row) -> rusqlite::Result<Knowledge> {
        let kind: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        Ok(Knowledge {
            id: row.get(0)?,
            role_id: row.get(1)?,
            name: row.get(2)?,
            content: row.get(3)?,
            kind: KnowledgeKind::from_str(&kind).unwrap(),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::models::KnowledgeKind;

    #[test]
    fn knowledge_is_scoped_to_its_role_and_newest_first() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.add_knowledge("grandpa", "first memory", None, KnowledgeKind::Text)
            .expect("add");
        db.add_knowledge("grandpa", "second memory", Some("The farm"), KnowledgeKind::Text)
            .expect("add");
        db.add_knowledge("grandma", "her memory", None, KnowledgeKind::Text)
            .expect("add");

        let grandpa = db.list_role_knowledge("grandpa").expect("list");
        assert_eq!(grandpa.len(), 2);
        assert_eq!(grandpa[0].content, "second memory");
        assert_eq!(grandpa[0].name, "The farm");
        assert_eq!(grandpa[1].content, "first memory");

        let grandma = db.list_role_knowledge("grandma").expect("list");
        assert_eq!(grandma.len(), 1);
        assert_eq!(grandma[0].content, "her memory");

        assert_eq!(db.count_role_knowledge("grandpa").expect("count"), 2);
        assert_eq!(
            db.role_knowledge_texts("grandpa").expect("texts"),
            vec!["second memory".to_string(), "first memory".to_string()]
        );
    }

    #[test]
    fn update_bumps_updated_at_and_keeps_created_at() {
        let db = Database::new(":memory:").expect("in-memory db");
        let entry = db
            .add_knowledge("grandpa", "draft", None, KnowledgeKind::Text)
            .expect("add");

        let updated = db
            .update_knowledge(&entry.id, "final", Some("Renamed"))
            .expect("update")
            .expect("exists");
        assert_eq!(updated.content, "final");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.created_at, entry.created_at);
        assert!(updated.updated_at >= entry.updated_at);

        assert!(db.update_knowledge("nope", "x", None).expect("update").is_none());
    }

    #[test]
    fn delete_removes_the_entry() {
        let db = Database::new(":memory:").expect("in-memory db");
        let entry = db
            .add_knowledge("grandpa", "memory", None, KnowledgeKind::File)
            .expect("add");

        assert!(db.delete_knowledge(&entry.id).expect("delete"));
        assert!(db.get_knowledge(&entry.id).expect("get").is_none());
        assert!(!db.delete_knowledge(&entry.id).expect("delete again"));
    }
}
