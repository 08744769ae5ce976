// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User row operations.

use relaydesk_core::{RelaydeskError, UserRecord};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<UserRecord, rusqlite::Error> {
    Ok(UserRecord {
        user_id: row.get(0)?,
        anon_id: row.get(1)?,
        room_id: row.get(2)?,
        current_ticket_id: row.get(3)?,
        current_chat_room_id: row.get(4)?,
    })
}

const USER_COLUMNS: &str = "user_id, anon_id, room_id, current_ticket_id, current_chat_room_id";

pub async fn create_user(
    db: &Database,
    user_id: &str,
    anon_id: &str,
) -> Result<(), RelaydeskError> {
    let user_id = user_id.to_string();
    let anon_id = anon_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, anon_id) VALUES (?1, ?2)",
                params![user_id, anon_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user(
    db: &Database,
    user_id: &str,
) -> Result<Option<UserRecord>, RelaydeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"
            ))?;
            let result = stmt.query_row(params![user_id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user_by_anon_id(
    db: &Database,
    anon_id: &str,
) -> Result<Option<UserRecord>, RelaydeskError> {
    let anon_id = anon_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE anon_id = ?1"
            ))?;
            let result = stmt.query_row(params![anon_id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_user_room(
    db: &Database,
    user_id: &str,
    room_id: Option<&str>,
) -> Result<(), RelaydeskError> {
    let user_id = user_id.to_string();
    let room_id = room_id.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET room_id = ?1 WHERE user_id = ?2",
                params![room_id, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_user_current_ticket(
    db: &Database,
    anon_id: &str,
    ticket_id: Option<i64>,
) -> Result<(), RelaydeskError> {
    let anon_id = anon_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET current_ticket_id = ?1 WHERE anon_id = ?2",
                params![ticket_id, anon_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user_current_ticket(
    db: &Database,
    anon_id: &str,
) -> Result<Option<i64>, RelaydeskError> {
    let anon_id = anon_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT current_ticket_id FROM users WHERE anon_id = ?1",
                params![anon_id],
                |row| row.get::<_, Option<i64>>(0),
            );
            match result {
                Ok(ticket_id) => Ok(ticket_id),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_user_current_chat_room(
    db: &Database,
    user_id: &str,
    chat_room_id: Option<&str>,
) -> Result<(), RelaydeskError> {
    let user_id = user_id.to_string();
    let chat_room_id = chat_room_id.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET current_chat_room_id = ?1 WHERE user_id = ?2",
                params![chat_room_id, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_user() {
        let (db, _dir) = setup_db().await;
        create_user(&db, "@alice:example.org", "SwiftHeron42")
            .await
            .unwrap();

        let user = get_user(&db, "@alice:example.org").await.unwrap().unwrap();
        assert_eq!(user.anon_id, "SwiftHeron42");
        assert!(user.room_id.is_none());
        assert!(user.current_ticket_id.is_none());

        let by_anon = get_user_by_anon_id(&db, "SwiftHeron42")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_anon.user_id, "@alice:example.org");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user(&db, "@nobody:example.org").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_and_clear_user_room() {
        let (db, _dir) = setup_db().await;
        create_user(&db, "@alice:example.org", "SwiftHeron42")
            .await
            .unwrap();

        set_user_room(&db, "@alice:example.org", Some("!dm:example.org"))
            .await
            .unwrap();
        let user = get_user(&db, "@alice:example.org").await.unwrap().unwrap();
        assert_eq!(user.room_id.as_deref(), Some("!dm:example.org"));

        set_user_room(&db, "@alice:example.org", None).await.unwrap();
        let user = get_user(&db, "@alice:example.org").await.unwrap().unwrap();
        assert!(user.room_id.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn current_ticket_round_trips() {
        let (db, _dir) = setup_db().await;
        create_user(&db, "@alice:example.org", "SwiftHeron42")
            .await
            .unwrap();

        set_user_current_ticket(&db, "SwiftHeron42", Some(7))
            .await
            .unwrap();
        assert_eq!(
            get_user_current_ticket(&db, "SwiftHeron42").await.unwrap(),
            Some(7)
        );

        set_user_current_ticket(&db, "SwiftHeron42", None)
            .await
            .unwrap();
        assert_eq!(
            get_user_current_ticket(&db, "SwiftHeron42").await.unwrap(),
            None
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_anon_id_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_user(&db, "@alice:example.org", "SwiftHeron42")
            .await
            .unwrap();
        let result = create_user(&db, "@bob:example.org", "SwiftHeron42").await;
        assert!(result.is_err());
        db.close().await.unwrap();
    }
}
