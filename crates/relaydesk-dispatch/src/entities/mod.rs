// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities as thin live views over repository rows.

pub mod chat;
pub mod staff;
pub mod ticket;
pub mod user;

pub use chat::Chat;
pub use staff::Staff;
pub use ticket::{Ticket, TicketCache};
pub use user::User;
