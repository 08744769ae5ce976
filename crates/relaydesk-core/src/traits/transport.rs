// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport client trait: the narrow interface to the protocol client.
//!
//! The protocol client (sync loop, encryption, room bookkeeping) lives
//! outside this workspace; the dispatch core only ever talks to it through
//! this trait.

use async_trait::async_trait;

use crate::error::RelaydeskError;
use crate::types::{EncryptedEventRecord, IncomingEvent, RoomInfo};

/// Narrow interface to the underlying chat protocol client.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// The bot's own platform user id, used for self-origin filtering.
    fn user_id(&self) -> &str;

    /// Look up the client's current view of a room, if it is known.
    fn room_info(&self, room_id: &str) -> Option<RoomInfo>;

    /// Send a text message. Returns the event id of the sent message.
    async fn send_text(
        &self,
        room_id: &str,
        body: &str,
        notice: bool,
    ) -> Result<String, RelaydeskError>;

    /// Redact an earlier event. Returns the event id of the redaction.
    async fn send_redaction(
        &self,
        room_id: &str,
        event_id: &str,
        reason: Option<&str>,
    ) -> Result<String, RelaydeskError>;

    /// Create a room with the given name, inviting the listed users.
    /// Returns the new room id.
    async fn create_room(
        &self,
        name: &str,
        invitees: &[String],
    ) -> Result<String, RelaydeskError>;

    /// Invite a user into a room.
    async fn invite(&self, room_id: &str, user_id: &str) -> Result<(), RelaydeskError>;

    /// Join a room the bot was invited to.
    async fn join(&self, room_id: &str) -> Result<(), RelaydeskError>;

    /// Request the session key for an undecryptable event.
    ///
    /// May fail with [`RelaydeskError::KeyShareAlreadyRequested`] when a
    /// request for the same session is already outstanding; callers tolerate
    /// that condition.
    async fn request_session_key(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<(), RelaydeskError>;

    /// Retry decryption of a stored encrypted event.
    async fn decrypt(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<IncomingEvent, RelaydeskError>;
}
