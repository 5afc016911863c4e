//! Voice sample blobs, owner-scoped

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::{VoiceMeta, VoiceSample};

impl Database {
    pub fn add_voice(&self, voice: &VoiceSample) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO voices (id, user_id, name, mime_type, size, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                &voice.id,
                &voice.user_id,
                &voice.name,
                &voice.mime_type,
                voice.size,
                &voice.data,
                &voice.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a sample with its audio payload
    pub fn get_voice(&self, id: &str) -> SqliteResult<Option<VoiceSample>> {
        let conn = self.conn();
        let voice = conn
            .query_row(
                "SELECT id, user_id, name, mime_type, size, data, created_at
                 FROM voices WHERE id = ?1",
                [id],
                |row| {
                    let created_at_str: String = row.get(6)?;
                    Ok(VoiceSample {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        mime_type: row.get(3)?,
                        size: row.get(4)?,
                        data: row.get(5)?,
                        created_at: DateTime::parse_from_rfc3339(&created_at_str)
                            .unwrap()
                            .with_timezone(&Utc),
                    })
                },
            )
            .ok();
        Ok(voice)
    }

    /// List a user's samples without loading the audio payloads
    pub fn list_user_voice_meta(&self, user_id: &str) -> SqliteResult<Vec<VoiceMeta>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, mime_type, size, created_at
             FROM voices WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;

        let metas = stmt
            .query_map([user_id], |row| {
                let created_at_str: String = row.get(5)?;
                Ok(VoiceMeta {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    mime_type: row.get(3)?,
                    size: row.get(4)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at_str)
                        .unwrap()
                        .with_timezone(&Utc),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(metas)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::db::Database;
    use crate::models::VoiceSample;

    fn make_sample(user_id: &str, name: &str, data: &[u8]) -> VoiceSample {
        VoiceSample {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            mime_type: "audio/mpeg".to_string(),
            size: data.len() as i64,
            data: data.to_vec(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blob_round_trip_keeps_bytes_and_metadata() {
        let db = Database::new(":memory:").expect("in-memory db");
        let sample = make_sample("alice", "hello.mp3", &[0u8, 1, 2, 255, 128]);
        db.add_voice(&sample).expect("add");

        let loaded = db.get_voice(&sample.id).expect("get").expect("exists");
        assert_eq!(loaded.data, sample.data);
        assert_eq!(loaded.mime_type, "audio/mpeg");
        assert_eq!(loaded.size, 5);
        assert_eq!(loaded.name, "hello.mp3");
    }

    #[test]
    fn meta_listing_is_owner_scoped() {
        let db = Database::new(":memory:").expect("in-memory db");
        db.add_voice(&make_sample("alice", "a.mp3", b"aaaa")).expect("add");
        db.add_voice(&make_sample("alice", "b.mp3", b"bb")).expect("add");
        db.add_voice(&make_sample("bob", "c.mp3", b"c")).expect("add");

        let metas = db.list_user_voice_meta("alice").expect("list");
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].name, "a.mp3");
        assert_eq!(metas[0].size, 4);
        assert_eq!(metas[1].name, "b.mp3");
    }
}
