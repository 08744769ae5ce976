// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Repository`] implementation backed by SQLite.

use async_trait::async_trait;
use relaydesk_core::{
    ChatRecord, EncryptedEventRecord, RelaydeskError, Repository, StaffRecord, TicketRecord,
    TicketStatus, UserRecord,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed repository. Cheap to share behind an `Arc`.
pub struct SqliteRepository {
    db: Database,
}

impl SqliteRepository {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn open(path: &str) -> Result<Self, RelaydeskError> {
        let db = Database::open(path).await?;
        Ok(Self { db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn close(&self) -> Result<(), RelaydeskError> {
        self.db.close().await
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_user(&self, user_id: &str, anon_id: &str) -> Result<(), RelaydeskError> {
        queries::users::create_user(&self.db, user_id, anon_id).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, RelaydeskError> {
        queries::users::get_user(&self.db, user_id).await
    }

    async fn get_user_by_anon_id(
        &self,
        anon_id: &str,
    ) -> Result<Option<UserRecord>, RelaydeskError> {
        queries::users::get_user_by_anon_id(&self.db, anon_id).await
    }

    async fn set_user_room(
        &self,
        user_id: &str,
        room_id: Option<&str>,
    ) -> Result<(), RelaydeskError> {
        queries::users::set_user_room(&self.db, user_id, room_id).await
    }

    async fn set_user_current_ticket(
        &self,
        anon_id: &str,
        ticket_id: Option<i64>,
    ) -> Result<(), RelaydeskError> {
        queries::users::set_user_current_ticket(&self.db, anon_id, ticket_id).await
    }

    async fn get_user_current_ticket(
        &self,
        anon_id: &str,
    ) -> Result<Option<i64>, RelaydeskError> {
        queries::users::get_user_current_ticket(&self.db, anon_id).await
    }

    async fn set_user_current_chat_room(
        &self,
        user_id: &str,
        chat_room_id: Option<&str>,
    ) -> Result<(), RelaydeskError> {
        queries::users::set_user_current_chat_room(&self.db, user_id, chat_room_id).await
    }

    async fn create_ticket(
        &self,
        anon_id: &str,
        ticket_name: &str,
    ) -> Result<i64, RelaydeskError> {
        queries::tickets::create_ticket(&self.db, anon_id, ticket_name).await
    }

    async fn get_ticket(&self, ticket_id: i64) -> Result<Option<TicketRecord>, RelaydeskError> {
        queries::tickets::get_ticket(&self.db, ticket_id).await
    }

    async fn set_ticket_room_id(
        &self,
        ticket_id: i64,
        room_id: &str,
    ) -> Result<(), RelaydeskError> {
        queries::tickets::set_ticket_room_id(&self.db, ticket_id, room_id).await
    }

    async fn set_ticket_status(
        &self,
        ticket_id: i64,
        status: TicketStatus,
    ) -> Result<(), RelaydeskError> {
        queries::tickets::set_ticket_status(&self.db, ticket_id, status).await
    }

    async fn assigned_staff(&self, ticket_id: i64) -> Result<Vec<String>, RelaydeskError> {
        queries::tickets::assigned_staff(&self.db, ticket_id).await
    }

    async fn assigned_support(&self, ticket_id: i64) -> Result<Vec<String>, RelaydeskError> {
        queries::tickets::assigned_support(&self.db, ticket_id).await
    }

    async fn assign_staff(&self, ticket_id: i64, user_id: &str) -> Result<(), RelaydeskError> {
        queries::tickets::assign_staff(&self.db, ticket_id, user_id).await
    }

    async fn assign_support(&self, ticket_id: i64, user_id: &str) -> Result<(), RelaydeskError> {
        queries::tickets::assign_support(&self.db, ticket_id, user_id).await
    }

    async fn create_chat(&self, chat_room_id: &str, anon_id: &str) -> Result<(), RelaydeskError> {
        queries::chats::create_chat(&self.db, chat_room_id, anon_id).await
    }

    async fn get_chat(&self, chat_room_id: &str) -> Result<Option<ChatRecord>, RelaydeskError> {
        queries::chats::get_chat(&self.db, chat_room_id).await
    }

    async fn get_staff(&self, user_id: &str) -> Result<Option<StaffRecord>, RelaydeskError> {
        queries::staff::get_staff(&self.db, user_id).await
    }

    async fn add_staff(&self, user_id: &str) -> Result<(), RelaydeskError> {
        queries::staff::add_staff(&self.db, user_id).await
    }

    async fn put_encrypted_event(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<(), RelaydeskError> {
        queries::encrypted::put_encrypted_event(&self.db, record).await
    }

    async fn encrypted_events_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<EncryptedEventRecord>, RelaydeskError> {
        queries::encrypted::encrypted_events_by_session(&self.db, session_id).await
    }

    async fn encrypted_events_by_sender(
        &self,
        sender: &str,
    ) -> Result<Vec<EncryptedEventRecord>, RelaydeskError> {
        queries::encrypted::encrypted_events_by_sender(&self.db, sender).await
    }

    async fn remove_encrypted_event(&self, event_id: &str) -> Result<(), RelaydeskError> {
        queries::encrypted::remove_encrypted_event(&self.db, event_id).await
    }

    async fn put_event_pair(
        &self,
        origin_event_id: &str,
        relayed_event_id: &str,
        relayed_room_id: &str,
    ) -> Result<(), RelaydeskError> {
        queries::event_pairs::put_event_pair(
            &self.db,
            origin_event_id,
            relayed_event_id,
            relayed_room_id,
        )
        .await
    }

    async fn get_related(
        &self,
        origin_event_id: &str,
    ) -> Result<Option<(String, String)>, RelaydeskError> {
        queries::event_pairs::get_related(&self.db, origin_event_id).await
    }
}
