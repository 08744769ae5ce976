// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User entity: a transient projection over the user row, reconstructed on
//! every lookup. No cross-event identity caching.

use relaydesk_core::{names, RelaydeskError, Repository, UserRecord};
use tracing::info;

pub struct User {
    pub record: UserRecord,
}

impl User {
    pub async fn get_existing(
        repo: &dyn Repository,
        user_id: &str,
    ) -> Result<Option<Self>, RelaydeskError> {
        Ok(repo.get_user(user_id).await?.map(|record| Self { record }))
    }

    pub async fn get_by_anon_id(
        repo: &dyn Repository,
        anon_id: &str,
    ) -> Result<Option<Self>, RelaydeskError> {
        Ok(repo
            .get_user_by_anon_id(anon_id)
            .await?
            .map(|record| Self { record }))
    }

    /// Create a user row with a freshly generated anonymized id, retrying
    /// a few times on an id collision.
    pub async fn create(repo: &dyn Repository, user_id: &str) -> Result<Self, RelaydeskError> {
        let mut last_err = None;
        for _ in 0..5 {
            let anon_id = names::generate_anon_id();
            match repo.create_user(user_id, &anon_id).await {
                Ok(()) => {
                    info!(user_id = user_id, anon_id = %anon_id, "created user");
                    return Ok(Self {
                        record: UserRecord {
                            user_id: user_id.to_string(),
                            anon_id,
                            room_id: None,
                            current_ticket_id: None,
                            current_chat_room_id: None,
                        },
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            RelaydeskError::Internal("user creation failed".to_string())
        }))
    }

    pub async fn get_or_create(
        repo: &dyn Repository,
        user_id: &str,
    ) -> Result<Self, RelaydeskError> {
        match Self::get_existing(repo, user_id).await? {
            Some(user) => Ok(user),
            None => Self::create(repo, user_id).await,
        }
    }

    /// Set or clear the communications room pointer.
    pub async fn set_room(
        &mut self,
        repo: &dyn Repository,
        room_id: Option<&str>,
    ) -> Result<(), RelaydeskError> {
        repo.set_user_room(&self.record.user_id, room_id).await?;
        self.record.room_id = room_id.map(|s| s.to_string());
        Ok(())
    }

    pub async fn set_current_ticket(
        &mut self,
        repo: &dyn Repository,
        ticket_id: Option<i64>,
    ) -> Result<(), RelaydeskError> {
        repo.set_user_current_ticket(&self.record.anon_id, ticket_id)
            .await?;
        self.record.current_ticket_id = ticket_id;
        Ok(())
    }

    pub async fn set_current_chat_room(
        &mut self,
        repo: &dyn Repository,
        chat_room_id: Option<&str>,
    ) -> Result<(), RelaydeskError> {
        repo.set_user_current_chat_room(&self.record.user_id, chat_room_id)
            .await?;
        self.record.current_chat_room_id = chat_room_id.map(|s| s.to_string());
        Ok(())
    }
}
