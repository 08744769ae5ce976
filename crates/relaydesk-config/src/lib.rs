// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Relaydesk support bot.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use relaydesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("command prefix: {}", config.bot.command_prefix);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{BotConfig, RelaydeskConfig, RoomsConfig, StorageConfig};
pub use validation::{render_errors, validate_config, ConfigError};

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to a [`ConfigError::Parse`]
pub fn load_and_validate() -> Result<RelaydeskConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse {
            message: err.to_string(),
        }]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<RelaydeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse {
            message: err.to_string(),
        }]),
    }
}

/// Load configuration from an explicit file path and validate it, bypassing
/// the XDG lookup. Env vars still override.
pub fn load_and_validate_path(
    path: &std::path::Path,
) -> Result<RelaydeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse {
            message: err.to_string(),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_and_validate() {
        let config = load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.bot.command_prefix, "!rd");
        assert!(config.bot.ignore_old_messages);
        assert!(config.rooms.management_room_id.is_none());
    }

    #[test]
    fn toml_sections_override_defaults() {
        let toml = r#"
[bot]
command_prefix = "!support"
welcome_message = "Hello! A staff member will reply shortly."

[rooms]
management_room_id = "!mgmt:example.org"
logging_room_id = "!audit:example.org"
mention_only_rooms = ["!lobby:example.org"]
mention_only_always_for_named = true
"#;
        let config = load_and_validate_str(toml).unwrap();
        assert_eq!(config.bot.command_prefix, "!support");
        assert_eq!(
            config.rooms.management_room_id.as_deref(),
            Some("!mgmt:example.org")
        );
        assert!(config.rooms.mention_only_always_for_named);
        assert_eq!(config.rooms.mention_only_rooms.len(), 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[bot]
comand_prefix = "!oops"
"#;
        let result = load_and_validate_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_room_id_is_rejected() {
        let toml = r#"
[rooms]
management_room_id = "mgmt"
"#;
        let result = load_and_validate_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaydesk.toml");
        std::fs::write(
            &path,
            "[rooms]\nmanagement_room_id = \"!mgmt:example.org\"\n",
        )
        .unwrap();

        let config = load_and_validate_path(&path).unwrap();
        assert_eq!(
            config.rooms.management_room_id.as_deref(),
            Some("!mgmt:example.org")
        );
    }
}
