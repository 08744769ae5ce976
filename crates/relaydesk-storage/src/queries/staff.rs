// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff roster operations.

use relaydesk_core::{RelaydeskError, StaffRecord};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

pub async fn get_staff(
    db: &Database,
    user_id: &str,
) -> Result<Option<StaffRecord>, RelaydeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT user_id FROM staff WHERE user_id = ?1",
                params![user_id],
                |row| Ok(StaffRecord { user_id: row.get(0)? }),
            );
            match result {
                Ok(staff) => Ok(Some(staff)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Add a user to the staff roster. Adding an existing member is a no-op.
pub async fn add_staff(db: &Database, user_id: &str) -> Result<(), RelaydeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO staff (user_id) VALUES (?1)",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
