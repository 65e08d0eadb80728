//! Clap adapter for the settings engine.
//!
//! Compiled only with the `clap` Cargo feature (on by default). Embed
//! [`SettingsArgs`] in your `#[derive(Parser)]` struct to get
//! `settings list|get|set|unset|reset|active|apply` subcommands.
//!
//! The only bridge to the core is [`SettingsArgs::into_action()`], which
//! converts clap-parsed arguments into a [`SettingsAction`](crate::SettingsAction).
//! Everything after that goes through
//! [`Settings::handle()`](crate::Settings::handle), which knows nothing about
//! clap.

use clap::{Args, Subcommand};

use crate::types::SettingsAction;

/// Clap-derived args for the `settings` subcommand group.
///
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Settings(SettingsArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: Option<SettingsSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsSubcommand {
    /// Show every option's effective value.
    List,
    /// Show the effective value and description of one option.
    Get {
        /// Option key (e.g. "waypipeCompress").
        key: String,
    },
    /// Normalize and persist a value.
    Set {
        /// Option key (e.g. "waypipeCompress").
        key: String,
        /// Raw value, as typed.
        value: String,
    },
    /// Remove a persisted value so the default applies again.
    Unset {
        /// Option key (e.g. "waypipeCompress").
        key: String,
    },
    /// Reset every option to its default.
    Reset,
    /// List the options that currently have an effect.
    Active,
    /// Push the effective settings to the native layer.
    Apply {
        /// Print the native record as JSON instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
}

impl SettingsArgs {
    /// Bare `settings` and `settings list` both map to `SettingsAction::List`.
    pub fn into_action(self) -> SettingsAction {
        match self.action {
            None | Some(SettingsSubcommand::List) => SettingsAction::List,
            Some(SettingsSubcommand::Get { key }) => SettingsAction::Get { key },
            Some(SettingsSubcommand::Set { key, value }) => SettingsAction::Set { key, value },
            Some(SettingsSubcommand::Unset { key }) => SettingsAction::Unset { key },
            Some(SettingsSubcommand::Reset) => SettingsAction::Reset,
            Some(SettingsSubcommand::Active) => SettingsAction::Active,
            Some(SettingsSubcommand::Apply { dry_run }) => SettingsAction::Apply { dry_run },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Wrapper so we can use `try_parse_from` on the subcommand.
    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: SettingsArgs,
    }

    fn parse(args: &[&str]) -> SettingsAction {
        TestCli::try_parse_from(args).unwrap().settings.into_action()
    }

    #[test]
    fn parse_bare_settings_is_list() {
        assert_eq!(parse(&["test"]), SettingsAction::List);
    }

    #[test]
    fn parse_explicit_list() {
        assert_eq!(parse(&["test", "list"]), SettingsAction::List);
    }

    #[test]
    fn parse_get() {
        assert_eq!(
            parse(&["test", "get", "waypipeVideo"]),
            SettingsAction::Get {
                key: "waypipeVideo".into()
            }
        );
    }

    #[test]
    fn parse_set() {
        assert_eq!(
            parse(&["test", "set", "waypipeCompress", "zstd"]),
            SettingsAction::Set {
                key: "waypipeCompress".into(),
                value: "zstd".into(),
            }
        );
    }

    #[test]
    fn parse_set_empty_value() {
        assert_eq!(
            parse(&["test", "set", "waypipeDisplay", ""]),
            SettingsAction::Set {
                key: "waypipeDisplay".into(),
                value: String::new(),
            }
        );
    }

    #[test]
    fn parse_unset() {
        assert_eq!(
            parse(&["test", "unset", "waypipeSSHHost"]),
            SettingsAction::Unset {
                key: "waypipeSSHHost".into()
            }
        );
    }

    #[test]
    fn parse_reset_and_active() {
        assert_eq!(parse(&["test", "reset"]), SettingsAction::Reset);
        assert_eq!(parse(&["test", "active"]), SettingsAction::Active);
    }

    #[test]
    fn parse_apply() {
        assert_eq!(
            parse(&["test", "apply"]),
            SettingsAction::Apply { dry_run: false }
        );
        assert_eq!(
            parse(&["test", "apply", "--dry-run"]),
            SettingsAction::Apply { dry_run: true }
        );
    }

    #[test]
    fn set_requires_value() {
        assert!(TestCli::try_parse_from(["test", "set", "waypipeCompress"]).is_err());
    }

    #[test]
    fn invalid_subcommand_errors() {
        assert!(TestCli::try_parse_from(["test", "gen"]).is_err());
    }
}
