// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relaydesk support bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Relaydesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// `rooms.management_room_id` is required before the bot can serve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaydeskConfig {
    /// Bot identity and message behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Room identities and relay gating.
    #[serde(default)]
    pub rooms: RoomsConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bot identity and message behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Command prefix recognized in management and ticket rooms.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Welcome message sent once per room after the bot joins.
    /// `None` disables the welcome message.
    #[serde(default)]
    pub welcome_message: Option<String>,

    /// Discard events older than the age threshold at dispatch time.
    #[serde(default = "default_ignore_old_messages")]
    pub ignore_old_messages: bool,

    /// Replace sender identities with anonymized display ids in relays.
    #[serde(default = "default_anonymise_senders")]
    pub anonymise_senders: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            welcome_message: None,
            ignore_old_messages: default_ignore_old_messages(),
            anonymise_senders: default_anonymise_senders(),
            log_level: default_log_level(),
        }
    }
}

fn default_command_prefix() -> String {
    "!rd".to_string()
}

fn default_ignore_old_messages() -> bool {
    true
}

fn default_anonymise_senders() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Room identities and relay gating configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoomsConfig {
    /// Room where staff coordinate and receive notifications.
    /// Required before the bot can serve.
    #[serde(default)]
    pub management_room_id: Option<String>,

    /// Dedicated audit room. Events inside it are never acted on.
    #[serde(default)]
    pub logging_room_id: Option<String>,

    /// Rooms (ids or aliases) that only relay when the bot is mentioned.
    #[serde(default)]
    pub mention_only_rooms: Vec<String>,

    /// Treat every named room as mention-only.
    #[serde(default)]
    pub mention_only_always_for_named: bool,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relaydesk").join("relaydesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("relaydesk.db"))
        .to_string_lossy()
        .into_owned()
}
