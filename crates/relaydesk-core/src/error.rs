// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relaydesk support bot.

use thiserror::Error;

/// The primary error type used across the Relaydesk collaborator traits and
/// the dispatch core.
#[derive(Debug, Error)]
pub enum RelaydeskError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transient protocol errors (send/create/invite failures). Logged by
    /// callers, never retried automatically.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A key sharing request is already outstanding for this session.
    /// The one tolerated transport condition: logged, never treated as failure.
    #[error("a key sharing request is already sent out for this session")]
    KeyShareAlreadyRequested,

    /// An event could not be decrypted. The event is persisted for replay,
    /// never dropped.
    #[error("failed to decrypt event {event_id}")]
    Decryption { event_id: String },

    /// A room did not resolve to the entity the handler expected.
    #[error("state resolution failed: {0}")]
    StateResolution(String),

    /// A persisted encrypted-event payload could not be decoded during replay.
    #[error("malformed persisted event: {0}")]
    MalformedEvent(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelaydeskError {
    /// Build a transport error from a plain message.
    pub fn transport(message: impl Into<String>) -> Self {
        RelaydeskError::Transport {
            message: message.into(),
            source: None,
        }
    }
}
