// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct chat room operations.

use relaydesk_core::{ChatRecord, RelaydeskError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

pub async fn create_chat(
    db: &Database,
    chat_room_id: &str,
    anon_id: &str,
) -> Result<(), RelaydeskError> {
    let chat_room_id = chat_room_id.to_string();
    let anon_id = anon_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chats (chat_room_id, anon_id) VALUES (?1, ?2)",
                params![chat_room_id, anon_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_chat(
    db: &Database,
    chat_room_id: &str,
) -> Result<Option<ChatRecord>, RelaydeskError> {
    let chat_room_id = chat_room_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT chat_room_id, anon_id FROM chats WHERE chat_room_id = ?1",
                params![chat_room_id],
                |row| {
                    Ok(ChatRecord {
                        chat_room_id: row.get(0)?,
                        anon_id: row.get(1)?,
                    })
                },
            );
            match result {
                Ok(chat) => Ok(Some(chat)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn create_and_get_chat() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        create_chat(&db, "!chat:example.org", "SwiftHeron42")
            .await
            .unwrap();

        let chat = get_chat(&db, "!chat:example.org").await.unwrap().unwrap();
        assert_eq!(chat.anon_id, "SwiftHeron42");

        assert!(get_chat(&db, "!other:example.org").await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
