// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relaydesk support bot.
//!
//! This crate provides the event taxonomy, domain records, error type, and
//! the narrow collaborator traits (transport client, repository) that the
//! dispatch core is written against.

pub mod error;
pub mod names;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RelaydeskError;
pub use traits::{Repository, TransportClient};
pub use types::{
    ChatRecord, EncryptedEventRecord, EventKind, EventMeta, IncomingEvent,
    KeyRequestEvent, Membership, RoomInfo, RoomKeyEvent, StaffRecord,
    TicketRecord, TicketStatus, UserRecord,
};
