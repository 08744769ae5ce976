// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event dispatcher: one entry per event kind, a shared preamble of
//! cross-cutting filters, and delegation to the typed relay handlers.
//!
//! Preamble order: age filter, logging-room gate, dedup-list trim, event-id
//! deduplication, self-origin filter. Handlers assume the preamble has run
//! and do not re-check.

use std::sync::Arc;

use chrono::Utc;
use relaydesk_config::RelaydeskConfig;
use relaydesk_core::{
    EventKind, EventMeta, IncomingEvent, Membership, RelaydeskError, Repository,
    RoomInfo, TransportClient,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::dedup::DedupList;
use crate::entities::{TicketCache, User};
use crate::pending::PendingRoomTasks;
use crate::relay::{CallRelay, MediaRelay, RedactionRelay, TextRelay};

/// Events older than this are discarded at dispatch time.
pub const MAX_EVENT_AGE_MS: i64 = 300_000;

/// Whether an event's server timestamp is past the age cutoff.
pub(crate) fn is_too_old(server_ts_ms: i64, now_ms: i64) -> bool {
    now_ms - server_ts_ms > MAX_EVENT_AGE_MS
}

pub struct Dispatcher {
    pub(crate) transport: Arc<dyn TransportClient>,
    pub(crate) repo: Arc<dyn Repository>,
    pub(crate) config: RelaydeskConfig,
    /// Event ids already processed, newest first.
    pub(crate) seen_events: Mutex<DedupList>,
    /// Rooms that already received the welcome message.
    pub(crate) welcomed_rooms: Mutex<DedupList>,
    pub(crate) ticket_cache: TicketCache,
    pub(crate) pending: PendingRoomTasks,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn TransportClient>,
        repo: Arc<dyn Repository>,
        config: RelaydeskConfig,
    ) -> Self {
        Self {
            transport,
            repo,
            config,
            seen_events: Mutex::new(DedupList::new()),
            welcomed_rooms: Mutex::new(DedupList::new()),
            ticket_cache: TicketCache::new(),
            pending: PendingRoomTasks::new(),
        }
    }

    pub fn pending(&self) -> &PendingRoomTasks {
        &self.pending
    }

    pub fn ticket_cache(&self) -> &TicketCache {
        &self.ticket_cache
    }

    /// Dispatch one inbound room event to its kind-specific handler.
    pub async fn dispatch(
        &self,
        room: &RoomInfo,
        event: &IncomingEvent,
    ) -> Result<(), RelaydeskError> {
        match &event.kind {
            EventKind::Membership {
                membership,
                prev_membership,
            } => {
                self.on_membership(room, &event.meta, *membership, *prev_membership)
                    .await
            }
            EventKind::Text { body } => {
                if !self.preamble(room, &event.meta).await {
                    return Ok(());
                }
                TextRelay::new(self, room, &event.meta, body).process().await
            }
            EventKind::Media {
                msgtype,
                body,
                url,
                file,
                info: _,
            } => {
                if !self.preamble(room, &event.meta).await {
                    return Ok(());
                }
                MediaRelay::new(
                    self,
                    room,
                    &event.meta,
                    msgtype,
                    body,
                    url.as_deref(),
                    file.is_some(),
                )
                .process()
                .await
            }
            EventKind::Redaction { redacts, reason } => {
                if !self.preamble(room, &event.meta).await {
                    return Ok(());
                }
                RedactionRelay::new(self, room, &event.meta, redacts, reason.as_deref())
                    .process()
                    .await
            }
            EventKind::Call { call_type } => {
                if !self.preamble(room, &event.meta).await {
                    return Ok(());
                }
                CallRelay::new(self, room, &event.meta, call_type)
                    .process()
                    .await
            }
            EventKind::Encrypted {
                session_id,
                payload,
            } => {
                // No dedup recording here: the replayed plaintext carries the
                // same event id, and recording it now would suppress the
                // replay. Storing the record twice is idempotent.
                if !self.preamble_no_dedup(room, &event.meta).await {
                    return Ok(());
                }
                self.on_decryption_failure(room, &event.meta, session_id, payload)
                    .await
            }
        }
    }

    /// The full preamble for message-like events: the shared filters plus the
    /// self-origin check.
    async fn preamble(&self, room: &RoomInfo, meta: &EventMeta) -> bool {
        if !self.should_process(room, meta).await {
            return false;
        }
        if meta.sender == self.transport.user_id() {
            debug!(event_id = %meta.event_id, "ignoring own event");
            return false;
        }
        true
    }

    /// Age filter, logging-room gate, and self-origin check, without touching
    /// the dedup list.
    async fn preamble_no_dedup(&self, room: &RoomInfo, meta: &EventMeta) -> bool {
        if self.config.bot.ignore_old_messages {
            let now_ms = Utc::now().timestamp_millis();
            if is_too_old(meta.server_ts_ms, now_ms) {
                return false;
            }
        }
        if self.config.rooms.logging_room_id.as_deref() == Some(room.room_id.as_str()) {
            return false;
        }
        meta.sender != self.transport.user_id()
    }

    /// Age filter, logging-room gate, dedup-list trim, and event-id
    /// deduplication. Returns whether processing should continue.
    async fn should_process(&self, room: &RoomInfo, meta: &EventMeta) -> bool {
        if self.config.bot.ignore_old_messages {
            let now_ms = Utc::now().timestamp_millis();
            if is_too_old(meta.server_ts_ms, now_ms) {
                debug!(event_id = %meta.event_id, "ignoring stale event");
                return false;
            }
        }
        if self.config.rooms.logging_room_id.as_deref() == Some(room.room_id.as_str()) {
            return false;
        }
        {
            let mut seen = self.seen_events.lock().await;
            seen.trim();
            if seen.contains(&meta.event_id) {
                debug!(event_id = %meta.event_id, "duplicate event delivery");
                return false;
            }
            seen.record(meta.event_id.clone());
        }
        self.welcomed_rooms.lock().await.trim();
        true
    }

    /// Membership changes. Runs the shared filters but not the self-origin
    /// check: the bot's own join is the signal for room setup.
    async fn on_membership(
        &self,
        room: &RoomInfo,
        meta: &EventMeta,
        membership: Membership,
        prev_membership: Option<Membership>,
    ) -> Result<(), RelaydeskError> {
        if !self.should_process(room, meta).await {
            return Ok(());
        }
        let self_id = self.transport.user_id();

        // A member leaving their registered communications room invalidates
        // the pointer; later sends must fail fast, not target a left room.
        if membership == Membership::Leave && meta.sender != self_id {
            if let Some(mut user) = User::get_existing(self.repo.as_ref(), &meta.sender).await?
                && user.record.room_id.as_deref() == Some(room.room_id.as_str())
            {
                user.set_room(self.repo.as_ref(), None).await?;
                info!(
                    user_id = %meta.sender,
                    room_id = %room.room_id,
                    "member left their communications room"
                );
            }
        }

        // An invite sent by the bot itself signals the room's secure channel
        // is initialized; queued outbound tasks can go out now. Third-party
        // invites say nothing about rooms the bot set up.
        if membership == Membership::Invite && meta.sender == self_id {
            self.pending.flush(&room.room_id).await;
        }

        // Idempotent join handling: only the bot's own fresh join proceeds.
        if meta.sender != self_id
            || membership != Membership::Join
            || prev_membership == Some(Membership::Join)
        {
            return Ok(());
        }

        if room.creator != self_id {
            let mut user = User::get_or_create(self.repo.as_ref(), &room.creator).await?;
            user.set_room(self.repo.as_ref(), Some(&room.room_id)).await?;

            if let Some(welcome) = self.config.bot.welcome_message.clone() {
                let first_time = {
                    let mut welcomed = self.welcomed_rooms.lock().await;
                    welcomed.trim();
                    if welcomed.contains(&room.room_id) {
                        false
                    } else {
                        welcomed.record(room.room_id.clone());
                        true
                    }
                };
                if first_time
                    && let Err(e) = self
                        .transport
                        .send_text(&room.room_id, &welcome, true)
                        .await
                {
                    warn!(room_id = %room.room_id, error = %e, "failed to send welcome message");
                }
            }

            self.notify_management(&format!(
                "Joined room {} (created by {}).",
                room.display_name, user.record.anon_id
            ))
            .await;
        }
        Ok(())
    }

    /// The bot was invited to a room; accept it. Invites are redelivered on
    /// sync restarts, so the event id runs through the dedup list first.
    pub async fn on_invite(&self, event_id: &str, room_id: &str) -> Result<(), RelaydeskError> {
        {
            let mut seen = self.seen_events.lock().await;
            seen.trim();
            if seen.contains(event_id) {
                debug!(event_id = event_id, "duplicate invite delivery");
                return Ok(());
            }
            seen.record(event_id.to_string());
        }
        info!(room_id = room_id, "accepting room invite");
        self.transport.join(room_id).await
    }

    /// Best-effort notification to the management room.
    pub(crate) async fn notify_management(&self, text: &str) {
        let Some(room_id) = self.config.rooms.management_room_id.as_deref() else {
            warn!("management room not configured, dropping notification");
            return;
        };
        if let Err(e) = self.transport.send_text(room_id, text, true).await {
            warn!(error = %e, "failed to notify management room");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_cutoff_is_strict() {
        let now = 1_000_000_000;
        // 301 seconds old: stale.
        assert!(is_too_old(now - 301_000, now));
        // Exactly 300 seconds old: still processed.
        assert!(!is_too_old(now - MAX_EVENT_AGE_MS, now));
        assert!(!is_too_old(now, now));
        // Clock skew into the future is not stale.
        assert!(!is_too_old(now + 5_000, now));
    }
}
