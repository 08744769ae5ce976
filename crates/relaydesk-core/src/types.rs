// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event taxonomy and domain records shared across the Relaydesk workspace.
//!
//! Inbound protocol events arrive as an [`IncomingEvent`] carrying a tagged
//! [`EventKind`]; the dispatcher matches on the kind exhaustively, so adding
//! a new event kind is a compile-time-checked change. Domain records are thin
//! row projections owned by the repository; the in-memory entity objects are
//! reconstructed from them on every lookup.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RelaydeskError;

/// Protocol-level view of the room an event arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: String,
    /// Raw room name. `None` for unnamed rooms (typically direct messages).
    pub name: Option<String>,
    pub display_name: String,
    pub canonical_alias: Option<String>,
    /// Platform user id of the room creator.
    pub creator: String,
    pub is_named: bool,
    pub is_group: bool,
}

/// Fields every inbound room event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    pub event_id: String,
    pub sender: String,
    /// Server timestamp in milliseconds since the epoch.
    pub server_ts_ms: i64,
}

/// Membership state carried by a membership change event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    Invite,
    Join,
    Leave,
    Ban,
    Knock,
}

/// Per-kind payload of an inbound room event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A room member's state changed.
    Membership {
        membership: Membership,
        prev_membership: Option<Membership>,
    },
    /// A plain text message.
    Text { body: String },
    /// An image, file, audio, or video message.
    Media {
        msgtype: String,
        body: String,
        url: Option<String>,
        file: Option<serde_json::Value>,
        info: Option<serde_json::Value>,
    },
    /// A redaction of an earlier event.
    Redaction {
        redacts: String,
        reason: Option<String>,
    },
    /// Call signaling (invite, candidates, answer, hangup).
    Call { call_type: String },
    /// An event that failed to decrypt, carrying its raw payload and the
    /// cryptographic session it belongs to.
    Encrypted {
        session_id: String,
        payload: serde_json::Value,
    },
}

/// A single inbound room event: identity plus kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    pub meta: EventMeta,
    pub kind: EventKind,
}

/// To-device key-exchange event announcing that a session key arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomKeyEvent {
    pub sender: String,
    pub session_id: String,
}

/// To-device request for a session key from another device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequestEvent {
    pub sender: String,
    pub requesting_device_id: String,
}

/// Ticket lifecycle status.
///
/// OPEN -> CLAIMED is implicit in staff assignment (the status field itself
/// does not change on claim); OPEN/CLAIMED -> CLOSED is terminal for the id
/// with respect to the process-local ticket cache.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Open,
    Claimed,
    Closed,
}

/// Repository row for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Stable platform user id.
    pub user_id: String,
    /// Anonymized display id, unique, generated once.
    pub anon_id: String,
    /// Current communications room. Cleared when the user leaves it.
    pub room_id: Option<String>,
    pub current_ticket_id: Option<i64>,
    pub current_chat_room_id: Option<String>,
}

/// Repository row for a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub id: i64,
    /// Anonymized id of the owning user.
    pub anon_id: String,
    pub ticket_room_id: Option<String>,
    pub status: TicketStatus,
    pub ticket_name: String,
}

/// Repository row for an ongoing anonymized chat conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub chat_room_id: String,
    /// Anonymized id of the owning user.
    pub anon_id: String,
}

/// Repository row for a privileged operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    pub user_id: String,
}

/// A retained raw event payload awaiting decryption keys.
///
/// Keyed by session id for batch replay and by event id for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEventRecord {
    pub event_id: String,
    pub sender: String,
    pub session_id: String,
    pub room_id: String,
    /// Raw event source, JSON-encoded.
    pub payload: String,
}

impl EncryptedEventRecord {
    /// Decode the persisted payload back into its JSON source.
    ///
    /// Fails with [`RelaydeskError::MalformedEvent`] when the stored text is
    /// corrupt; replay skips the single record in that case.
    pub fn decode_payload(&self) -> Result<serde_json::Value, RelaydeskError> {
        serde_json::from_str(&self.payload).map_err(|e| {
            RelaydeskError::MalformedEvent(format!(
                "event {}: {e}",
                self.event_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ticket_status_round_trips_through_strings() {
        for status in [TicketStatus::Open, TicketStatus::Claimed, TicketStatus::Closed] {
            let s = status.to_string();
            assert_eq!(TicketStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(TicketStatus::Closed.to_string(), "CLOSED");
    }

    #[test]
    fn membership_parses_wire_strings() {
        assert_eq!(Membership::from_str("join").unwrap(), Membership::Join);
        assert_eq!(Membership::from_str("invite").unwrap(), Membership::Invite);
        assert!(Membership::from_str("banished").is_err());
    }

    #[test]
    fn encrypted_record_decodes_valid_payload() {
        let record = EncryptedEventRecord {
            event_id: "$e1".into(),
            sender: "@user:example.org".into(),
            session_id: "sess-1".into(),
            room_id: "!room:example.org".into(),
            payload: r#"{"type":"m.room.encrypted","content":{}}"#.into(),
        };
        let value = record.decode_payload().unwrap();
        assert_eq!(value["type"], "m.room.encrypted");
    }

    #[test]
    fn encrypted_record_rejects_corrupt_payload() {
        let record = EncryptedEventRecord {
            event_id: "$e1".into(),
            sender: "@user:example.org".into(),
            session_id: "sess-1".into(),
            room_id: "!room:example.org".into(),
            payload: "{not json".into(),
        };
        assert!(matches!(
            record.decode_payload(),
            Err(RelaydeskError::MalformedEvent(_))
        ));
    }
}
