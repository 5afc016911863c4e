//! Web login sessions backing the session cookie

use chrono::{DateTime, Duration, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::AuthSession;

impl Database {
    /// Create a login session for a user. Sessions live 24 hours from
    /// creation and slide forward on each successful validation.
    pub fn create_session(&self, user_id: &str) -> SqliteResult<AuthSession> {
        let conn = self.conn();
        let token = Self::generate_session_token();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::hours(24);

        conn.execute(
            "INSERT INTO auth_sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                &token,
                user_id,
                &created_at.to_rfc3339(),
                &expires_at.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();

        Ok(AuthSession {
            id,
            token,
            user_id: user_id.to_string(),
            created_at,
            expires_at,
        })
    }

    fn generate_session_token() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..32)
            .map(|_| format!("{:x}", rng.r#gen::<u8>() % 16))
            .collect()
    }

    pub fn validate_session(&self, token: &str) -> SqliteResult<Option<AuthSession>> {
        let conn = self.conn();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let mut stmt = conn.prepare(
            "SELECT id, token, user_id, created_at, expires_at FROM auth_sessions
             WHERE token = ?1 AND expires_at > ?2",
        )?;

        let session = stmt
            .query_row(rusqlite::params![token, &now_str], |row| {
                let created_at_str: String = row.get(3)?;
                let expires_at_str: String = row.get(4)?;

                Ok(AuthSession {
                    id: row.get(0)?,
                    token: row.get(1)?,
                    user_id: row.get(2)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at_str)
                        .unwrap()
                        .with_timezone(&Utc),
                    expires_at: DateTime::parse_from_rfc3339(&expires_at_str)
                        .unwrap()
                        .with_timezone(&Utc),
                })
            })
            .ok();

        // Extend session expiry on successful validation (keep active sessions alive)
        if session.is_some() {
            let new_expires = (now + Duration::hours(24)).to_rfc3339();
            let _ = conn.execute(
                "UPDATE auth_sessions SET expires_at = ?1 WHERE token = ?2",
                rusqlite::params![&new_expires, token],
            );
        }

        Ok(session)
    }

    pub fn delete_session(&self, token: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn session_round_trip() {
        let db = Database::new(":memory:").expect("in-memory db");
        let session = db.create_session("alice").expect("create");
        assert_eq!(session.token.len(), 32);

        let validated = db
            .validate_session(&session.token)
            .expect("validate")
            .expect("valid");
        assert_eq!(validated.user_id, "alice");

        assert!(db.delete_session(&session.token).expect("delete"));
        assert!(db.validate_session(&session.token).expect("validate").is_none());
    }

    #[test]
    fn unknown_and_expired_tokens_are_rejected() {
        let db = Database::new(":memory:").expect("in-memory db");
        assert!(db.validate_session("deadbeef").expect("validate").is_none());

        let session = db.create_session("alice").expect("create");
        db.conn()
            .execute(
                "UPDATE auth_sessions SET expires_at = '2001-01-01T00:00:00+00:00' WHERE token = ?1",
                [&session.token],
            )
            .expect("expire");
        assert!(db.validate_session(&session.token).expect("validate").is_none());
    }
}
