// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per table family.

pub mod chats;
pub mod encrypted;
pub mod event_pairs;
pub mod staff;
pub mod tickets;
pub mod users;
