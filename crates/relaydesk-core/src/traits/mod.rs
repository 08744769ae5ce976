// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the dispatch core.

pub mod repository;
pub mod transport;

pub use repository::Repository;
pub use transport::TransportClient;
