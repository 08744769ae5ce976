// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaydesk add-staff` command implementation.
//!
//! Staff have no self-service signup; operators grant the role from the CLI.

use relaydesk_config::RelaydeskConfig;
use relaydesk_core::RelaydeskError;
use relaydesk_dispatch::entities::Staff;
use relaydesk_storage::SqliteRepository;

/// Run the `relaydesk add-staff` command. Granting an existing member is a
/// no-op.
pub async fn run_add_staff(
    config: &RelaydeskConfig,
    user_id: &str,
) -> Result<(), RelaydeskError> {
    let repo = SqliteRepository::open(&config.storage.database_path).await?;
    Staff::create(&repo, user_id).await?;
    repo.close().await?;

    println!("{user_id} is now staff");
    Ok(())
}
