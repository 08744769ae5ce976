// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping between origin events and their relayed copies, used to relay
//! redactions to the correct clone.

use relaydesk_core::RelaydeskError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Record that `origin_event_id` was relayed as `relayed_event_id` into
/// `relayed_room_id`.
pub async fn put_event_pair(
    db: &Database,
    origin_event_id: &str,
    relayed_event_id: &str,
    relayed_room_id: &str,
) -> Result<(), RelaydeskError> {
    let origin_event_id = origin_event_id.to_string();
    let relayed_event_id = relayed_event_id.to_string();
    let relayed_room_id = relayed_room_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO event_pairs
                 (origin_event_id, relayed_event_id, relayed_room_id)
                 VALUES (?1, ?2, ?3)",
                params![origin_event_id, relayed_event_id, relayed_room_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The relayed copy of an origin event, as `(relayed_event_id, relayed_room_id)`.
pub async fn get_related(
    db: &Database,
    origin_event_id: &str,
) -> Result<Option<(String, String)>, RelaydeskError> {
    let origin_event_id = origin_event_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT relayed_event_id, relayed_room_id FROM event_pairs
                 WHERE origin_event_id = ?1",
                params![origin_event_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            );
            match result {
                Ok(pair) => Ok(Some(pair)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}
