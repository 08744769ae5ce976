// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket row operations, including staff and support assignments.

use relaydesk_core::{RelaydeskError, TicketRecord, TicketStatus};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

fn row_to_ticket(row: &rusqlite::Row<'_>) -> Result<(i64, String, Option<String>, String, String), rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn parse_status(raw: &str) -> Result<TicketStatus, RelaydeskError> {
    raw.parse::<TicketStatus>()
        .map_err(|_| RelaydeskError::Internal(format!("unknown ticket status in database: {raw}")))
}

const TICKET_COLUMNS: &str = "id, anon_id, ticket_room_id, status, ticket_name";

/// Insert a new ticket and return its row id.
pub async fn create_ticket(
    db: &Database,
    anon_id: &str,
    ticket_name: &str,
) -> Result<i64, RelaydeskError> {
    let anon_id = anon_id.to_string();
    let ticket_name = ticket_name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tickets (anon_id, ticket_name) VALUES (?1, ?2)",
                params![anon_id, ticket_name],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_ticket(
    db: &Database,
    ticket_id: i64,
) -> Result<Option<TicketRecord>, RelaydeskError> {
    let raw = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![ticket_id], row_to_ticket);
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)?;

    match raw {
        None => Ok(None),
        Some((id, anon_id, ticket_room_id, status, ticket_name)) => Ok(Some(TicketRecord {
            id,
            anon_id,
            ticket_room_id,
            status: parse_status(&status)?,
            ticket_name,
        })),
    }
}

pub async fn set_ticket_room_id(
    db: &Database,
    ticket_id: i64,
    room_id: &str,
) -> Result<(), RelaydeskError> {
    let room_id = room_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tickets SET ticket_room_id = ?1 WHERE id = ?2",
                params![room_id, ticket_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_ticket_status(
    db: &Database,
    ticket_id: i64,
    status: TicketStatus,
) -> Result<(), RelaydeskError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tickets SET status = ?1 WHERE id = ?2",
                params![status, ticket_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn assigned_staff(db: &Database, ticket_id: i64) -> Result<Vec<String>, RelaydeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM ticket_staff WHERE ticket_id = ?1 ORDER BY user_id",
            )?;
            let rows = stmt.query_map(params![ticket_id], |row| row.get(0))?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn assigned_support(
    db: &Database,
    ticket_id: i64,
) -> Result<Vec<String>, RelaydeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM ticket_support WHERE ticket_id = ?1 ORDER BY user_id",
            )?;
            let rows = stmt.query_map(params![ticket_id], |row| row.get(0))?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(map_tr_err)
}

/// Assign a staff member to a ticket. A duplicate assignment is a no-op.
pub async fn assign_staff(
    db: &Database,
    ticket_id: i64,
    user_id: &str,
) -> Result<(), RelaydeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO ticket_staff (ticket_id, user_id) VALUES (?1, ?2)",
                params![ticket_id, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Assign a secondary support member. A duplicate assignment is a no-op.
pub async fn assign_support(
    db: &Database,
    ticket_id: i64,
    user_id: &str,
) -> Result<(), RelaydeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO ticket_support (ticket_id, user_id) VALUES (?1, ?2)",
                params![ticket_id, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
