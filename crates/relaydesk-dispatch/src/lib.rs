// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatch and session-state resolution engine for Relaydesk.
//!
//! Inbound protocol events enter through the [`Dispatcher`], which applies
//! the cross-cutting filters (age, logging-room gate, deduplication,
//! self-origin), classifies the room via the [`resolver`], resolves the bound
//! entities, and delegates to the per-kind [`relay`] handlers. Undecryptable
//! events are held in a session-keyed retry queue; outbound sends into rooms
//! still establishing their secure channel are deferred per room and flushed
//! in FIFO order.

pub mod commands;
pub mod dedup;
pub mod dispatcher;
pub mod entities;
pub mod pending;
pub mod relay;
pub mod resolver;
mod retry;

pub use dedup::{DedupList, MAX_TRACKED};
pub use dispatcher::{Dispatcher, MAX_EVENT_AGE_MS};
pub use entities::{Chat, Staff, Ticket, TicketCache, User};
pub use pending::PendingRoomTasks;
pub use resolver::{determine_room_type, RequiredState, RoomState, RoomType};
