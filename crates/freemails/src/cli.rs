//! Command-line grammar.
//!
//! `clap` only collects the raw arguments; each one is then parsed into an
//! [`Action`] when its turn comes, so earlier arguments take effect before
//! a later one is rejected.

use anyhow::{Result, bail};
use clap::Parser;
use freemails_core::SettingName;

/// Text printed by `help`.
pub const USAGE: &str = "\
Usage: freemails [[+|-]<config_item>=<value>...] [-<config_item>...] [<command>...]
Config items:
    server, login, password : text (password= or password alone prompts)
    white_from, black_from, white_subject, black_subject, white_dir, black_dir : lists
    +<item>=<value> / -<item>=<value> : add to / remove from a list
    -<item> : delete an item
Commands:
    config : show configuration (default if no command is given)
    list : list \"From\" and \"Subject\" of all messages
    help : show this help";

/// Personal IMAP triage: frees or locks messages using allow/deny lists.
#[derive(Debug, Parser)]
#[command(name = "freemails", version, disable_help_flag = true)]
pub struct Cli {
    /// Settings to change and commands to run, processed in order.
    #[arg(value_name = "ARG", allow_hyphen_values = true, trailing_var_arg = true)]
    pub args: Vec<String>,
}

/// One step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `name=value`; `None` for `password=`, which prompts.
    Set(SettingName, Option<String>),
    /// `+name=value`.
    Add(SettingName, String),
    /// `-name=value`.
    Remove(SettingName, String),
    /// `-name`.
    Delete(SettingName),
    /// `password`.
    PromptPassword,
    /// `-h`, `--help`, `help`.
    Help,
    /// `config`.
    Config,
    /// `list`.
    List,
}

impl Action {
    /// Parses one argument.
    pub fn parse(arg: &str) -> Result<Self> {
        if let Some((name, value)) = arg.split_once('=') {
            return Self::parse_assignment(name, value);
        }

        match arg {
            "password" => Ok(Self::PromptPassword),
            "-h" | "--help" | "help" => Ok(Self::Help),
            "config" => Ok(Self::Config),
            "list" => Ok(Self::List),
            _ => match arg.strip_prefix('-') {
                Some(name) => Ok(Self::Delete(name.parse()?)),
                None => bail!("Unknown command: {arg}"),
            },
        }
    }

    fn parse_assignment(name: &str, value: &str) -> Result<Self> {
        let value = value.to_string();
        if let Some(name) = name.strip_prefix('+') {
            return Ok(Self::Add(name.parse()?, value));
        }
        if let Some(name) = name.strip_prefix('-') {
            return Ok(Self::Remove(name.parse()?, value));
        }

        let name: SettingName = name.parse()?;
        if name == SettingName::Password && value.is_empty() {
            Ok(Self::Set(name, None))
        } else {
            Ok(Self::Set(name, Some(value)))
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn parse(arg: &str) -> Action {
        Action::parse(arg).unwrap()
    }

    fn error(arg: &str) -> String {
        Action::parse(arg).unwrap_err().to_string()
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            parse("server=imap.example.com:993"),
            Action::Set(SettingName::Server, Some("imap.example.com:993".into()))
        );
        assert_eq!(
            parse("+white_from=*@trusted.com"),
            Action::Add(SettingName::WhiteFrom, "*@trusted.com".into())
        );
        assert_eq!(
            parse("-black_dir=Spam"),
            Action::Remove(SettingName::BlackDir, "Spam".into())
        );
        assert_eq!(
            parse("white_subject=a=b"),
            Action::Set(SettingName::WhiteSubject, Some("a=b".into()))
        );
    }

    #[test]
    fn test_password_prompts() {
        assert_eq!(parse("password="), Action::Set(SettingName::Password, None));
        assert_eq!(
            parse("password=hunter2"),
            Action::Set(SettingName::Password, Some("hunter2".into()))
        );
        assert_eq!(parse("password"), Action::PromptPassword);
        assert_eq!(parse("login="), Action::Set(SettingName::Login, Some(String::new())));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("config"), Action::Config);
        assert_eq!(parse("list"), Action::List);
        for help in ["-h", "--help", "help"] {
            assert_eq!(parse(help), Action::Help);
        }
        assert_eq!(parse("-login"), Action::Delete(SettingName::Login));
    }

    #[test]
    fn test_errors() {
        assert_eq!(error("colour=blue"), "Unknown config item: colour");
        assert_eq!(error("+colour=blue"), "Unknown config item: colour");
        assert_eq!(error("-colour"), "Unknown config item: colour");
        assert_eq!(error("--verbose"), "Unknown config item: -verbose");
        assert_eq!(error("frobnicate"), "Unknown command: frobnicate");
        assert_eq!(error("=x"), "Unknown config item: ");
    }

    #[test]
    fn test_clap_keeps_hyphen_arguments() {
        let cli = Cli::try_parse_from(["freemails", "-h", "-login", "+white_dir=News", "list"])
            .unwrap();
        assert_eq!(cli.args, vec!["-h", "-login", "+white_dir=News", "list"]);

        let cli = Cli::try_parse_from(["freemails"]).unwrap();
        assert!(cli.args.is_empty());
    }
}
