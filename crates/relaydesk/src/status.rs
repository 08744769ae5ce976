// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaydesk status` command implementation.
//!
//! Opens the database and prints entity counts.

use relaydesk_config::RelaydeskConfig;
use relaydesk_core::RelaydeskError;
use relaydesk_storage::Database;

struct Counts {
    users: i64,
    tickets: i64,
    open_tickets: i64,
    pending_encrypted: i64,
}

async fn load_counts(db: &Database) -> Result<Counts, RelaydeskError> {
    db.connection()
        .call(|conn| {
            let users = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            let tickets = conn.query_row("SELECT COUNT(*) FROM tickets", [], |r| r.get(0))?;
            let open_tickets = conn.query_row(
                "SELECT COUNT(*) FROM tickets WHERE status != 'CLOSED'",
                [],
                |r| r.get(0),
            )?;
            let pending_encrypted =
                conn.query_row("SELECT COUNT(*) FROM encrypted_events", [], |r| r.get(0))?;
            Ok::<_, rusqlite::Error>(Counts {
                users,
                tickets,
                open_tickets,
                pending_encrypted,
            })
        })
        .await
        .map_err(|e| RelaydeskError::Storage { source: Box::new(e) })
}

/// Run the `relaydesk status` command.
pub async fn run_status(config: &RelaydeskConfig) -> Result<(), RelaydeskError> {
    let db = Database::open(&config.storage.database_path).await?;
    let counts = load_counts(&db).await?;
    db.close().await?;

    println!("database: {}", config.storage.database_path);
    println!("users: {}", counts.users);
    println!(
        "tickets: {} ({} open)",
        counts.tickets, counts.open_tickets
    );
    println!("events awaiting keys: {}", counts.pending_encrypted);
    Ok(())
}
