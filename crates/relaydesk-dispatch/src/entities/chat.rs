// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat entity: an ongoing anonymized conversation room, keyed by room id.

use relaydesk_core::{ChatRecord, RelaydeskError, Repository};

pub struct Chat {
    pub record: ChatRecord,
}

impl Chat {
    pub async fn get_existing(
        repo: &dyn Repository,
        chat_room_id: &str,
    ) -> Result<Option<Self>, RelaydeskError> {
        Ok(repo.get_chat(chat_room_id).await?.map(|record| Self { record }))
    }

    pub async fn create(
        repo: &dyn Repository,
        chat_room_id: &str,
        anon_id: &str,
    ) -> Result<Self, RelaydeskError> {
        repo.create_chat(chat_room_id, anon_id).await?;
        Ok(Self {
            record: ChatRecord {
                chat_room_id: chat_room_id.to_string(),
                anon_id: anon_id.to_string(),
            },
        })
    }
}
