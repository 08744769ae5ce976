// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room classification and per-event state resolution.
//!
//! A [`RoomState`] is constructed per (room, event). Classification is pure
//! and deterministic given room identity, room name, and configuration; the
//! lookup operations are gated by the resulting [`RoomType`].

use std::sync::LazyLock;

use regex::Regex;
use relaydesk_core::{EventMeta, RelaydeskError, Repository, RoomInfo, TransportClient};
use relaydesk_config::RoomsConfig;
use tracing::warn;

use crate::entities::{Chat, Staff, Ticket, TicketCache, User};

/// The ticket id is embedded in the room's display name and is the sole
/// mechanism for recovering a ticket from a room.
static TICKET_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Ticket #(\d+) \(.+\)$").unwrap());

static CHAT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^chat-([A-Za-z0-9._=-]+)$").unwrap());

/// Exactly one classification per room, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    Management,
    Logging,
    Ticket,
    Chat,
    User,
}

/// The state a handler requires before it can act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredState {
    Management,
    Ticket,
    Chat,
    UserRoom,
}

/// Recover the ticket id from a ticket room's display name.
pub fn ticket_id_from_name(name: &str) -> Option<i64> {
    TICKET_NAME_RE
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Recover the chat key from a chat room's display name.
pub fn chat_key_from_name(name: &str) -> Option<String> {
    CHAT_NAME_RE
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Classify a room. Identity equality for management and logging, name
/// patterns for ticket and chat, user room for unnamed or unmatched rooms.
pub fn determine_room_type(rooms: &RoomsConfig, room: &RoomInfo) -> RoomType {
    if rooms.management_room_id.as_deref() == Some(room.room_id.as_str()) {
        return RoomType::Management;
    }
    if rooms.logging_room_id.as_deref() == Some(room.room_id.as_str()) {
        return RoomType::Logging;
    }
    let Some(name) = room.name.as_deref().filter(|_| room.is_named) else {
        return RoomType::User;
    };
    if TICKET_NAME_RE.is_match(name) {
        return RoomType::Ticket;
    }
    if CHAT_NAME_RE.is_match(name) {
        return RoomType::Chat;
    }
    RoomType::User
}

/// Whether the bot relays messages from this room only when mentioned.
pub fn is_mention_only(rooms: &RoomsConfig, room: &RoomInfo) -> bool {
    let listed = rooms.mention_only_rooms.iter().any(|r| {
        r == &room.room_id || room.canonical_alias.as_deref() == Some(r.as_str())
    });
    listed || (rooms.mention_only_always_for_named && room.is_named)
}

/// Per-event view of the room and the entities bound to it.
pub struct RoomState<'a> {
    pub room: &'a RoomInfo,
    pub meta: &'a EventMeta,
    pub room_type: RoomType,
    /// Human-readable room description for logging and messaging context.
    pub for_room: String,
    pub user: Option<User>,
    pub staff: Option<Staff>,
    pub ticket: Option<Ticket>,
    pub chat: Option<Chat>,
}

impl<'a> RoomState<'a> {
    pub fn new(rooms: &RoomsConfig, room: &'a RoomInfo, meta: &'a EventMeta) -> Self {
        let room_type = determine_room_type(rooms, room);
        Self {
            room,
            meta,
            room_type,
            for_room: format!("room {}", room.display_name),
            user: None,
            staff: None,
            ticket: None,
            chat: None,
        }
    }

    /// Staff lookup is unconditional: staff must be recognized regardless of
    /// room type.
    pub async fn find_state_staff(
        &mut self,
        repo: &dyn Repository,
    ) -> Result<bool, RelaydeskError> {
        self.staff = Staff::get_existing(repo, &self.meta.sender).await?;
        Ok(self.staff.is_some())
    }

    /// Resolve the sender's user row. Only meaningful in a user room.
    pub async fn find_state_user(
        &mut self,
        repo: &dyn Repository,
    ) -> Result<bool, RelaydeskError> {
        if self.room_type != RoomType::User {
            return Ok(false);
        }
        self.user = User::get_existing(repo, &self.meta.sender).await?;
        if let Some(user) = &self.user {
            self.for_room = format!(
                "{} in room {}",
                user.record.anon_id, self.room.display_name
            );
        }
        Ok(self.user.is_some())
    }

    /// Resolve the ticket bound to this room via the room-name pattern.
    pub async fn find_state_ticket(
        &mut self,
        repo: &dyn Repository,
        cache: &TicketCache,
    ) -> Result<bool, RelaydeskError> {
        if self.room_type != RoomType::Ticket {
            return Ok(false);
        }
        let Some(ticket_id) = self
            .room
            .name
            .as_deref()
            .and_then(ticket_id_from_name)
        else {
            return Ok(false);
        };
        self.ticket = Ticket::get_existing(repo, cache, ticket_id).await?;
        if self.ticket.is_some() {
            self.for_room = format!(
                "Ticket #{ticket_id} in room {}",
                self.room.display_name
            );
        }
        Ok(self.ticket.is_some())
    }

    /// Resolve the chat bound to this room.
    pub async fn find_state_chat(
        &mut self,
        repo: &dyn Repository,
    ) -> Result<bool, RelaydeskError> {
        if self.room_type != RoomType::Chat {
            return Ok(false);
        }
        self.chat = Chat::get_existing(repo, &self.room.room_id).await?;
        if let Some(chat) = &self.chat {
            self.for_room = format!(
                "chat with {} in room {}",
                chat.record.anon_id, self.room.display_name
            );
        }
        Ok(self.chat.is_some())
    }

    /// Satisfy the handler's required state, reporting failure to the room
    /// (or to the management room for user-room setup failures).
    ///
    /// Returns `false` when the required state could not be resolved; callers
    /// must abort the in-progress action.
    pub async fn resolve(
        &mut self,
        required: RequiredState,
        repo: &dyn Repository,
        cache: &TicketCache,
        transport: &dyn TransportClient,
        management_room_id: Option<&str>,
    ) -> Result<bool, RelaydeskError> {
        self.find_state_staff(repo).await?;
        match required {
            RequiredState::Management => {
                if self.room_type == RoomType::Management {
                    return Ok(true);
                }
                self.report(transport, "This action is only available in the management room.")
                    .await;
                Ok(false)
            }
            RequiredState::Ticket => {
                if self.find_state_ticket(repo, cache).await? {
                    return Ok(true);
                }
                self.report(transport, "No ticket could be resolved for this room.")
                    .await;
                Ok(false)
            }
            RequiredState::Chat => {
                if self.find_state_chat(repo).await? {
                    return Ok(true);
                }
                self.report(transport, "No chat could be resolved for this room.")
                    .await;
                Ok(false)
            }
            RequiredState::UserRoom => {
                match User::get_or_create(repo, &self.meta.sender).await {
                    Ok(user) => {
                        self.for_room = format!(
                            "{} in room {}",
                            user.record.anon_id, self.room.display_name
                        );
                        self.user = Some(user);
                        Ok(true)
                    }
                    Err(e) => {
                        warn!(
                            sender = %self.meta.sender,
                            error = %e,
                            "failed to set up user state"
                        );
                        if let Some(management) = management_room_id {
                            let text = format!(
                                "Failed to set up user state for a sender in {}: {e}",
                                self.for_room
                            );
                            if let Err(send_err) =
                                transport.send_text(management, &text, true).await
                            {
                                warn!(error = %send_err, "failed to report user setup failure");
                            }
                        }
                        Ok(false)
                    }
                }
            }
        }
    }

    async fn report(&self, transport: &dyn TransportClient, text: &str) {
        if let Err(e) = transport.send_text(&self.room.room_id, text, true).await {
            warn!(
                room_id = %self.room.room_id,
                error = %e,
                "failed to send state resolution error"
            );
        }
    }
}
