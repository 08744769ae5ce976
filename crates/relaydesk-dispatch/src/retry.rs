// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decryption retry queue: undecryptable events are persisted by session and
//! replayed through the normal dispatch path when the session key arrives.
//!
//! Replay is at-least-once. A record removed after successful processing may
//! be redelivered if removal fails; the dispatcher's id-based deduplication
//! absorbs the duplicate.

use relaydesk_core::{
    EncryptedEventRecord, EventMeta, KeyRequestEvent, RelaydeskError, RoomInfo,
    RoomKeyEvent,
};
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;

impl Dispatcher {
    /// An event failed to decrypt: persist it, request the session key, and
    /// surface unnamed-room failures to the management room.
    pub(crate) async fn on_decryption_failure(
        &self,
        room: &RoomInfo,
        meta: &EventMeta,
        session_id: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RelaydeskError> {
        let record = EncryptedEventRecord {
            event_id: meta.event_id.clone(),
            sender: meta.sender.clone(),
            session_id: session_id.to_string(),
            room_id: room.room_id.clone(),
            payload: payload.to_string(),
        };
        self.repo.put_encrypted_event(&record).await?;

        let waiting = self
            .repo
            .encrypted_events_by_sender(&meta.sender)
            .await?
            .len();
        info!(
            sender = %meta.sender,
            session_id = session_id,
            waiting = waiting,
            "stored undecryptable event, awaiting session key"
        );

        match self.transport.request_session_key(&record).await {
            Ok(()) => {}
            Err(RelaydeskError::KeyShareAlreadyRequested) => {
                debug!(session_id = session_id, "key request already outstanding");
            }
            Err(e) => {
                warn!(session_id = session_id, error = %e, "failed to request session key");
            }
        }

        // An unnamed room is likely a direct conversation; losing a message
        // there is costly enough to tell the operators. Without an audit room
        // the notice is the only trace, so send it regardless.
        if !room.is_named || self.config.rooms.logging_room_id.is_none() {
            self.notify_management(&format!(
                "Failed to decrypt a message from {} in room {}.",
                meta.sender, room.room_id
            ))
            .await;
        }
        Ok(())
    }

    /// A session key arrived: replay every stored event for the session.
    ///
    /// Each record is decoded, decrypted, removed, then re-dispatched through
    /// the normal path. A record that fails decoding or decryption is logged
    /// and left in place; it never aborts the batch.
    pub async fn on_room_key(&self, event: &RoomKeyEvent) -> Result<(), RelaydeskError> {
        let records = self
            .repo
            .encrypted_events_by_session(&event.session_id)
            .await?;
        if records.is_empty() {
            debug!(session_id = %event.session_id, "no stored events for session");
            return Ok(());
        }
        info!(
            session_id = %event.session_id,
            count = records.len(),
            "replaying stored events for session"
        );

        for record in records {
            if let Err(e) = record.decode_payload() {
                warn!(event_id = %record.event_id, error = %e, "skipping corrupt stored event");
                continue;
            }
            let plaintext = match self.transport.decrypt(&record).await {
                Ok(ev) => ev,
                Err(e) => {
                    warn!(
                        event_id = %record.event_id,
                        error = %e,
                        "stored event still undecryptable"
                    );
                    continue;
                }
            };
            let Some(room) = self.transport.room_info(&record.room_id) else {
                warn!(
                    event_id = %record.event_id,
                    room_id = %record.room_id,
                    "room for stored event no longer known"
                );
                continue;
            };
            self.repo.remove_encrypted_event(&record.event_id).await?;
            if let Err(e) = self.dispatch(&room, &plaintext).await {
                warn!(event_id = %record.event_id, error = %e, "replayed event handler failed");
            }
        }
        Ok(())
    }

    /// Another device asked for keys. Key sharing is the transport's concern;
    /// the dispatcher only records that it happened.
    pub async fn on_key_request(&self, event: &KeyRequestEvent) -> Result<(), RelaydeskError> {
        debug!(
            sender = %event.sender,
            device_id = %event.requesting_device_id,
            "received key request"
        );
        Ok(())
    }
}
