// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for the Relaydesk workspace.

pub mod memory_repo;
pub mod mock_transport;

pub use memory_repo::MemoryRepository;
pub use mock_transport::{MockTransport, SentMessage, SentRedaction};
