// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as room id shape and non-empty paths.

use miette::Diagnostic;
use thiserror::Error;

use crate::model::RelaydeskConfig;

/// Configuration error produced during loading or validation.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A semantic constraint on a deserialized value failed.
    #[error("{message}")]
    #[diagnostic(code(relaydesk::config::validation))]
    Validation { message: String },

    /// Figment could not parse or merge the configuration sources.
    #[error("{message}")]
    #[diagnostic(code(relaydesk::config::parse))]
    Parse { message: String },
}

/// Render a list of [`ConfigError`]s to stderr using miette's graphical
/// handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

fn looks_like_room_id(id: &str) -> bool {
    id.starts_with('!') && id.contains(':')
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelaydeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(ref id) = config.rooms.management_room_id
        && !looks_like_room_id(id)
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "rooms.management_room_id `{id}` does not look like a room id (expected `!local:server`)"
            ),
        });
    }

    if let Some(ref id) = config.rooms.logging_room_id
        && !looks_like_room_id(id)
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "rooms.logging_room_id `{id}` does not look like a room id (expected `!local:server`)"
            ),
        });
    }

    if config.bot.command_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bot.command_prefix must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(ref welcome) = config.bot.welcome_message
        && welcome.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "bot.welcome_message must not be blank; omit the key to disable it"
                .to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RelaydeskConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn deserialized_toml_validates() {
        let config: RelaydeskConfig = toml::from_str(
            r#"
[bot]
command_prefix = "!support"

[rooms]
management_room_id = "!mgmt:example.org"
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.bot.command_prefix, "!support");
    }

    #[test]
    fn malformed_management_room_id_fails_validation() {
        let mut config = RelaydeskConfig::default();
        config.rooms.management_room_id = Some("management".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("management_room_id"))
        ));
    }

    #[test]
    fn well_formed_room_ids_pass() {
        let mut config = RelaydeskConfig::default();
        config.rooms.management_room_id = Some("!mgmt:example.org".to_string());
        config.rooms.logging_room_id = Some("!audit:example.org".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_command_prefix_fails_validation() {
        let mut config = RelaydeskConfig::default();
        config.bot.command_prefix = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("command_prefix"))
        ));
    }

    #[test]
    fn blank_welcome_message_fails_validation() {
        let mut config = RelaydeskConfig::default();
        config.bot.welcome_message = Some("".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("welcome_message"))
        ));
    }
}
