// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage for events that failed decryption, keyed by event id and indexed
//! by megolm session so they can be replayed when the key arrives.

use relaydesk_core::{EncryptedEventRecord, RelaydeskError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<EncryptedEventRecord, rusqlite::Error> {
    Ok(EncryptedEventRecord {
        event_id: row.get(0)?,
        sender: row.get(1)?,
        session_id: row.get(2)?,
        room_id: row.get(3)?,
        payload: row.get(4)?,
    })
}

const EVENT_COLUMNS: &str = "event_id, sender, session_id, room_id, payload";

/// Persist an undecryptable event. Re-inserting the same event id replaces
/// the stored payload.
pub async fn put_encrypted_event(
    db: &Database,
    record: &EncryptedEventRecord,
) -> Result<(), RelaydeskError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO encrypted_events
                 (event_id, sender, session_id, room_id, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.event_id,
                    record.sender,
                    record.session_id,
                    record.room_id,
                    record.payload,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All stored events for a session, oldest first.
pub async fn encrypted_events_by_session(
    db: &Database,
    session_id: &str,
) -> Result<Vec<EncryptedEventRecord>, RelaydeskError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM encrypted_events
                 WHERE session_id = ?1 ORDER BY created_at, event_id"
            ))?;
            let rows = stmt.query_map(params![session_id], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// All stored events from a sender, oldest first.
pub async fn encrypted_events_by_sender(
    db: &Database,
    sender: &str,
) -> Result<Vec<EncryptedEventRecord>, RelaydeskError> {
    let sender = sender.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM encrypted_events
                 WHERE sender = ?1 ORDER BY created_at, event_id"
            ))?;
            let rows = stmt.query_map(params![sender], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_encrypted_event(
    db: &Database,
    event_id: &str,
) -> Result<(), RelaydeskError> {
    let event_id = event_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM encrypted_events WHERE event_id = ?1",
                params![event_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
