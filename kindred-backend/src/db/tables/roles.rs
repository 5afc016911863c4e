//! Persona role records, owner-scoped

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::Role;

impl Database {
    pub fn create_role(&self, role: &Role) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO roles (id, belongs_to, name, description, avatar, background, voice_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                &role.id,
                &role.belongs_to,
                &role.name,
                &role.description,
                &role.avatar,
                &role.background,
                &role.voice_id,
                &role.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_role(&self, id: &str) -> SqliteResult<Option<Role>> {
        let conn = self.conn();
        let role = conn
            .query_row(
                "SELECT id, belongs_to, name, description, avatar, background, voice_id, created_at
                 FROM roles WHERE id = ?1",
                [id],
                |row| Self::row_to_role(row),
            )
            .ok();
        Ok(role)
    }

    /// List a user's roles in creation order
    pub fn list_user_roles(&self, user_id: &str) -> SqliteResult<Vec<Role>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, belongs_to, name, description, avatar, background, voice_id, created_at
             FROM roles WHERE belongs_to = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;

        let roles = stmt
            .query_map([user_id], |row| Self::row_to_role(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(roles)
    }

    /// Delete a role. Scoped to the owner; returns false when nothing
    /// matched (missing role or someone else's).
    pub fn delete_role(&self, user_id: &str, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM roles WHERE id = ?1 AND belongs_to = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }

    fn row_to_role(row: &rusqlite::Row) -> rusqlite::Result<Role> {
        let created_at_str: String = row.get(7)?;
        Ok(Role {
            id: row.get(0)?,
            belongs_to: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            avatar: row.get(4)?,
            background: row.get(5)?,
            voice_id: row.get(6)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::db::Database;
    use crate::models::Role;

    fn make_role(id: &str, owner: &str) -> Role {
        Role {
            id: id.to_string(),
            belongs_to: owner.to_string(),
            name: format!("role-{}", id),
            description: "My digital relative".to_string(),
            avatar: String::new(),
            background: String::new(),
            voice_id: "default".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn listing_is_scoped_to_the_owner() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.create_role(&make_role("r1", "alice")).expect("create");
        db.create_role(&make_role("r2", "alice")).expect("create");
        db.create_role(&make_role("r3", "bob")).expect("create");

        let alice_roles = db.list_user_roles("alice").expect("list");
        assert_eq!(alice_roles.len(), 2);
        assert_eq!(alice_roles[0].id, "r1");
        assert_eq!(alice_roles[1].id, "r2");

        let bob_roles = db.list_user_roles("bob").expect("list");
        assert_eq!(bob_roles.len(), 1);
        assert_eq!(bob_roles[0].id, "r3");
    }

    #[test]
    fn delete_removes_from_subsequent_listings() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.create_role(&make_role("r1", "alice")).expect("create");

        assert!(db.delete_role("alice", "r1").expect("delete"));
        assert!(db.list_user_roles("alice").expect("list").is_empty());
        assert!(db.get_role("r1").expect("get").is_none());
    }

    #[test]
    fn delete_is_owner_scoped() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.create_role(&make_role("r1", "alice")).expect("create");

        assert!(!db.delete_role("bob", "r1").expect("delete"));
        assert!(db.get_role("r1").expect("get").is_some());
    }
}
