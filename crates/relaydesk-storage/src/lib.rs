// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Relaydesk.
//!
//! The [`SqliteRepository`] adapter implements the workspace
//! [`Repository`](relaydesk_core::Repository) trait on top of tokio-rusqlite,
//! with refinery-managed embedded migrations.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteRepository;
pub use database::Database;
