// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository trait: keyed persistence for users, tickets, chats, staff,
//! pending encrypted events, and relayed-event pairs.
//!
//! The repository is the durable source of truth. Entity objects are thin
//! projections reconstructed from these rows on every lookup; absence is
//! always `Ok(None)`, never an error.

use async_trait::async_trait;

use crate::error::RelaydeskError;
use crate::types::{
    ChatRecord, EncryptedEventRecord, StaffRecord, TicketRecord, TicketStatus,
    UserRecord,
};

/// Persistent entity storage consumed by the dispatch core.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---

    async fn create_user(
        &self,
        user_id: &str,
        anon_id: &str,
    ) -> Result<(), RelaydeskError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, RelaydeskError>;

    async fn get_user_by_anon_id(
        &self,
        anon_id: &str,
    ) -> Result<Option<UserRecord>, RelaydeskError>;

    /// Set or clear the user's communications room pointer.
    async fn set_user_room(
        &self,
        user_id: &str,
        room_id: Option<&str>,
    ) -> Result<(), RelaydeskError>;

    async fn set_user_current_ticket(
        &self,
        anon_id: &str,
        ticket_id: Option<i64>,
    ) -> Result<(), RelaydeskError>;

    async fn get_user_current_ticket(
        &self,
        anon_id: &str,
    ) -> Result<Option<i64>, RelaydeskError>;

    async fn set_user_current_chat_room(
        &self,
        user_id: &str,
        chat_room_id: Option<&str>,
    ) -> Result<(), RelaydeskError>;

    // --- Tickets ---

    /// Insert a new ticket row with status OPEN. Returns the assigned id.
    async fn create_ticket(
        &self,
        anon_id: &str,
        ticket_name: &str,
    ) -> Result<i64, RelaydeskError>;

    async fn get_ticket(
        &self,
        ticket_id: i64,
    ) -> Result<Option<TicketRecord>, RelaydeskError>;

    async fn set_ticket_room_id(
        &self,
        ticket_id: i64,
        room_id: &str,
    ) -> Result<(), RelaydeskError>;

    async fn set_ticket_status(
        &self,
        ticket_id: i64,
        status: TicketStatus,
    ) -> Result<(), RelaydeskError>;

    async fn assigned_staff(&self, ticket_id: i64) -> Result<Vec<String>, RelaydeskError>;

    async fn assigned_support(
        &self,
        ticket_id: i64,
    ) -> Result<Vec<String>, RelaydeskError>;

    async fn assign_staff(
        &self,
        ticket_id: i64,
        staff_id: &str,
    ) -> Result<(), RelaydeskError>;

    async fn assign_support(
        &self,
        ticket_id: i64,
        support_id: &str,
    ) -> Result<(), RelaydeskError>;

    // --- Chats ---

    async fn create_chat(
        &self,
        chat_room_id: &str,
        anon_id: &str,
    ) -> Result<(), RelaydeskError>;

    async fn get_chat(
        &self,
        chat_room_id: &str,
    ) -> Result<Option<ChatRecord>, RelaydeskError>;

    // --- Staff ---

    async fn get_staff(&self, user_id: &str) -> Result<Option<StaffRecord>, RelaydeskError>;

    async fn add_staff(&self, user_id: &str) -> Result<(), RelaydeskError>;

    // --- Pending encrypted events ---

    async fn put_encrypted_event(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<(), RelaydeskError>;

    /// All stored records for a session, in insertion order.
    async fn encrypted_events_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<EncryptedEventRecord>, RelaydeskError>;

    async fn encrypted_events_by_sender(
        &self,
        sender: &str,
    ) -> Result<Vec<EncryptedEventRecord>, RelaydeskError>;

    async fn remove_encrypted_event(&self, event_id: &str) -> Result<(), RelaydeskError>;

    // --- Relayed-event pairs ---

    /// Record that `origin_event_id` was relayed as `relayed_event_id` into
    /// `relayed_room_id`, so later redactions can follow the relay.
    async fn put_event_pair(
        &self,
        origin_event_id: &str,
        relayed_event_id: &str,
        relayed_room_id: &str,
    ) -> Result<(), RelaydeskError>;

    /// Look up the relayed (event id, room id) for an origin event.
    async fn get_related(
        &self,
        origin_event_id: &str,
    ) -> Result<Option<(String, String)>, RelaydeskError>;
}
