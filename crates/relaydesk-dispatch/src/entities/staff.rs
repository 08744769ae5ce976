// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff entity: privileged operators, looked up by sender id on every event.

use relaydesk_core::{RelaydeskError, Repository, StaffRecord};

pub struct Staff {
    pub record: StaffRecord,
}

impl Staff {
    pub async fn get_existing(
        repo: &dyn Repository,
        user_id: &str,
    ) -> Result<Option<Self>, RelaydeskError> {
        Ok(repo.get_staff(user_id).await?.map(|record| Self { record }))
    }

    pub async fn create(repo: &dyn Repository, user_id: &str) -> Result<Self, RelaydeskError> {
        repo.add_staff(user_id).await?;
        Ok(Self {
            record: StaffRecord {
                user_id: user_id.to_string(),
            },
        })
    }
}
