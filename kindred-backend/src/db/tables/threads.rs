//! Conversation threads and their append-only ordered messages

use chrono::Utc;
use rusqlite::{Connection, Result as SqliteResult};
use uuid::Uuid;

use super::super::Database;
use crate::models::{Message, MessageKind, MessageSender, Thread};

/// Title given to a thread before the user renames it
const DEFAULT_THREAD_TITLE: &str = "New conversation";

impl Database {
    pub fn create_thread(&self, user_id: &str, role_id: &str) -> SqliteResult<Thread> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO threads (id, user_id, role_id, title, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![&id, user_id, role_id, DEFAULT_THREAD_TITLE, &created_at],
        )?;

        Ok(Thread {
            id,
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
            title: DEFAULT_THREAD_TITLE.to_string(),
            content: Vec::new(),
        })
    }

    pub fn get_thread(&self, id: &str) -> SqliteResult<Option<Thread>> {
        let conn = self.conn();
        let header = conn
            .query_row(
                "SELECT id, user_id, role_id, title FROM threads WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .ok();

        let (id, user_id, role_id, title) = match header {
            Some(h) => h,
            None => return Ok(None),
        };

        let content = Self::thread_messages(&conn, &id)?;
        Ok(Some(Thread {
            id,
            user_id,
            role_id,
            title,
            content,
        }))
    }

    /// List a user's threads in creation order, each with its messages
    pub fn list_user_threads(&self, user_id: &str) -> SqliteResult<Vec<Thread>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, role_id, title FROM threads
             WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;

        let headers: Vec<(String, String, String, String)> = stmt
            .query_map([user_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .filter_map(|r| r.ok())
            .collect();

        let mut threads = Vec::with_capacity(headers.len());
        for (id, user_id, role_id, title) in headers {
            let content = Self::thread_messages(&conn, &id)?;
            threads.push(Thread {
                id,
                user_id,
                role_id,
                title,
                content,
            });
        }
        Ok(threads)
    }

    /// Delete a thread and its messages. Scoped to the owner.
    pub fn delete_thread(&self, user_id: &str, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM threads WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        if rows_affected > 0 {
            conn.execute("DELETE FROM messages WHERE thread_id = ?1", [id])?;
        }
        Ok(rows_affected > 0)
    }

    pub fn set_thread_title(&self, id: &str, title: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "UPDATE threads SET title = ?1 WHERE id = ?2",
            [title, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Append a message to a thread. Returns false when the thread does
    /// not exist.
    pub fn append_message(&self, thread_id: &str, message: &Message) -> SqliteResult<bool> {
        let conn = self.conn();
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM threads WHERE id = ?1",
            [thread_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO messages (id, thread_id, sender, sender_id, kind, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                &message.id,
                thread_id,
                message.sender.as_str(),
                &message.sender_id,
                message.kind.as_str(),
                &message.content,
                &Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(true)
    }

    fn thread_messages(conn: &Connection, thread_id: &str) -> SqliteResult<Vec<Message>> {
        let mut stmt = conn.prepare(
            "SELECT id, sender, sender_id, kind, content FROM messages
             WHERE thread_id = ?1 ORDER BY seq ASC",
        )?;

        let messages = stmt
            .query_map([thread_id], |row| {
                let sender: String = row.get(1)?;
                let kind: String = row.get(3)?;
                Ok(Message {
                    id: row.get(0)?,
                    sender: MessageSender::from_str(&sender).unwrap(),
                    sender_id: row.get(2)?,
                    kind: MessageKind::from_str(&kind).unwrap(),
                    content: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::db::Database;
    use crate::models::{Message, MessageKind, MessageSender};

    fn text_message(sender: MessageSender, content: &str) -> Message {
        Message {
            id: Uuid::new_v4().to_string(),
            sender,
            sender_id: "someone".to_string(),
            kind: MessageKind::Text,
            content: content.to_string(),
        }
    }

    #[test]
    fn append_grows_content_by_one_and_preserves_order() {
        let db = Database::new(":memory:").expect("in-memory db");
        let thread = db.create_thread("alice", "grandpa").expect("create");
        assert!(thread.content.is_empty());

        for (i, text) in ["hello", "how are you", "tell me a story"].iter().enumerate() {
            let before = db.get_thread(&thread.id).expect("get").expect("exists");
            assert!(db
                .append_message(&thread.id, &text_message(MessageSender::User, text))
                .expect("append"));
            let after = db.get_thread(&thread.id).expect("get").expect("exists");
            assert_eq!(after.content.len(), before.content.len() + 1);
            assert_eq!(after.content.len(), i + 1);
        }

        let thread = db.get_thread(&thread.id).expect("get").expect("exists");
        let contents: Vec<&str> = thread.content.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "how are you", "tell me a story"]);
    }

    #[test]
    fn append_to_missing_thread_reports_false() {
        let db = Database::new(":memory:").expect("in-memory db");
        assert!(!db
            .append_message("nope", &text_message(MessageSender::User, "hi"))
            .expect("append"));
    }

    #[test]
    fn delete_thread_removes_its_messages() {
        let db = Database::new(":memory:").expect("in-memory db");
        let thread = db.create_thread("alice", "grandpa").expect("create");
        db.append_message(&thread.id, &text_message(MessageSender::Ai, "hello"))
            .expect("append");

        assert!(db.delete_thread("alice", &thread.id).expect("delete"));
        assert!(db.get_thread(&thread.id).expect("get").is_none());

        let orphans: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE thread_id = ?1",
                [&thread.id],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(orphans, 0);
    }

    #[test]
    fn listing_and_rename_are_owner_visible() {
        let db = Database::new(":memory:").expect("in-memory db");
        let thread = db.create_thread("alice", "grandpa").expect("create");
        db.create_thread("bob", "grandma").expect("create");

        assert!(db.set_thread_title(&thread.id, "Summer stories").expect("rename"));
        assert!(!db.set_thread_title("nope", "x").expect("rename"));

        let threads = db.list_user_threads("alice").expect("list");
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].title, "Summer stories");
    }
}
