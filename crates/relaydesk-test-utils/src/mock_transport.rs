// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport client for deterministic testing.
//!
//! Outbound calls (sends, redactions, invites, joins, room creations, key
//! requests) are captured for assertion; room views and decryption results
//! are injectable.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use relaydesk_core::{
    EncryptedEventRecord, IncomingEvent, RelaydeskError, RoomInfo, TransportClient,
};

/// A text message captured by [`MockTransport::send_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub room_id: String,
    pub body: String,
    pub notice: bool,
    pub event_id: String,
}

/// A redaction captured by [`MockTransport::send_redaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRedaction {
    pub room_id: String,
    pub event_id: String,
    pub reason: Option<String>,
}

/// A mock protocol client capturing every outbound call.
pub struct MockTransport {
    user_id: String,
    rooms: Mutex<HashMap<String, RoomInfo>>,
    sent: Mutex<Vec<SentMessage>>,
    redactions: Mutex<Vec<SentRedaction>>,
    invites: Mutex<Vec<(String, String)>>,
    joined: Mutex<Vec<String>>,
    created_rooms: Mutex<Vec<(String, String, Vec<String>)>>,
    key_requests: Mutex<Vec<String>>,
    key_already_requested: AtomicBool,
    fail_sends: AtomicBool,
    decrypt_results: Mutex<HashMap<String, IncomingEvent>>,
}

impl MockTransport {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            rooms: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            redactions: Mutex::new(Vec::new()),
            invites: Mutex::new(Vec::new()),
            joined: Mutex::new(Vec::new()),
            created_rooms: Mutex::new(Vec::new()),
            key_requests: Mutex::new(Vec::new()),
            key_already_requested: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            decrypt_results: Mutex::new(HashMap::new()),
        }
    }

    /// Make a room known to the client's view.
    pub fn add_room(&self, room: RoomInfo) {
        self.rooms.lock().unwrap().insert(room.room_id.clone(), room);
    }

    /// All captured text messages, in send order.
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Captured text messages sent into one room.
    pub fn sent_to(&self, room_id: &str) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect()
    }

    pub fn sent_redactions(&self) -> Vec<SentRedaction> {
        self.redactions.lock().unwrap().clone()
    }

    pub fn invites(&self) -> Vec<(String, String)> {
        self.invites.lock().unwrap().clone()
    }

    pub fn joined_rooms(&self) -> Vec<String> {
        self.joined.lock().unwrap().clone()
    }

    /// Created rooms as (room id, name, invitees).
    pub fn created_rooms(&self) -> Vec<(String, String, Vec<String>)> {
        self.created_rooms.lock().unwrap().clone()
    }

    /// Session ids for which a key was requested.
    pub fn key_requests(&self) -> Vec<String> {
        self.key_requests.lock().unwrap().clone()
    }

    /// Make `request_session_key` fail with the tolerated "already
    /// requested" condition.
    pub fn set_key_already_requested(&self, value: bool) {
        self.key_already_requested.store(value, Ordering::SeqCst);
    }

    /// Make every `send_text` fail with a transport error.
    pub fn set_fail_sends(&self, value: bool) {
        self.fail_sends.store(value, Ordering::SeqCst);
    }

    /// Register the plaintext result that `decrypt` returns for an event id.
    /// Events without a registered result fail to decrypt.
    pub fn set_decrypt_result(&self, event_id: &str, plaintext: IncomingEvent) {
        self.decrypt_results
            .lock()
            .unwrap()
            .insert(event_id.to_string(), plaintext);
    }
}

#[async_trait]
impl TransportClient for MockTransport {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn room_info(&self, room_id: &str) -> Option<RoomInfo> {
        self.rooms.lock().unwrap().get(room_id).cloned()
    }

    async fn send_text(
        &self,
        room_id: &str,
        body: &str,
        notice: bool,
    ) -> Result<String, RelaydeskError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RelaydeskError::transport("mock send failure"));
        }
        let event_id = format!("$mock-{}", uuid::Uuid::new_v4());
        self.sent.lock().unwrap().push(SentMessage {
            room_id: room_id.to_string(),
            body: body.to_string(),
            notice,
            event_id: event_id.clone(),
        });
        Ok(event_id)
    }

    async fn send_redaction(
        &self,
        room_id: &str,
        event_id: &str,
        reason: Option<&str>,
    ) -> Result<String, RelaydeskError> {
        self.redactions.lock().unwrap().push(SentRedaction {
            room_id: room_id.to_string(),
            event_id: event_id.to_string(),
            reason: reason.map(|s| s.to_string()),
        });
        Ok(format!("$redaction-{}", uuid::Uuid::new_v4()))
    }

    async fn create_room(
        &self,
        name: &str,
        invitees: &[String],
    ) -> Result<String, RelaydeskError> {
        let mut created = self.created_rooms.lock().unwrap();
        let room_id = format!("!created-{}:example.org", created.len());
        created.push((room_id.clone(), name.to_string(), invitees.to_vec()));
        Ok(room_id)
    }

    async fn invite(&self, room_id: &str, user_id: &str) -> Result<(), RelaydeskError> {
        self.invites
            .lock()
            .unwrap()
            .push((room_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn join(&self, room_id: &str) -> Result<(), RelaydeskError> {
        self.joined.lock().unwrap().push(room_id.to_string());
        Ok(())
    }

    async fn request_session_key(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<(), RelaydeskError> {
        if self.key_already_requested.load(Ordering::SeqCst) {
            return Err(RelaydeskError::KeyShareAlreadyRequested);
        }
        self.key_requests
            .lock()
            .unwrap()
            .push(record.session_id.clone());
        Ok(())
    }

    async fn decrypt(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<IncomingEvent, RelaydeskError> {
        self.decrypt_results
            .lock()
            .unwrap()
            .get(&record.event_id)
            .cloned()
            .ok_or_else(|| RelaydeskError::Decryption {
                event_id: record.event_id.clone(),
            })
    }
}
