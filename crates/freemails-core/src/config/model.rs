//! Settings data model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// Name of a configurable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingName {
    /// IMAP server, `host` or `host:port`.
    Server,
    /// IMAP login.
    Login,
    /// IMAP password.
    Password,
    /// Senders always freed, exact or glob.
    WhiteFrom,
    /// Senders always locked, exact only.
    BlackFrom,
    /// Subjects always freed, exact or glob.
    WhiteSubject,
    /// Subjects always locked, exact only.
    BlackSubject,
    /// Folders whose messages are all freed.
    WhiteDir,
    /// Folders whose messages are all locked.
    BlackDir,
}

impl SettingName {
    /// Every setting, in display order.
    pub const ALL: [Self; 9] = [
        Self::Server,
        Self::Login,
        Self::Password,
        Self::WhiteFrom,
        Self::BlackFrom,
        Self::WhiteSubject,
        Self::BlackSubject,
        Self::WhiteDir,
        Self::BlackDir,
    ];

    /// Name as typed on the command line and stored on disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Login => "login",
            Self::Password => "password",
            Self::WhiteFrom => "white_from",
            Self::BlackFrom => "black_from",
            Self::WhiteSubject => "white_subject",
            Self::BlackSubject => "black_subject",
            Self::WhiteDir => "white_dir",
            Self::BlackDir => "black_dir",
        }
    }

    /// Returns true for set-valued settings.
    #[must_use]
    pub const fn is_list(self) -> bool {
        !matches!(self, Self::Server | Self::Login | Self::Password)
    }
}

impl fmt::Display for SettingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::Config(format!("Unknown config item: {s}")))
    }
}

/// The user's configuration.
///
/// Absent fields are not written to disk. An absent set reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// IMAP server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// IMAP login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// IMAP password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Sender allow list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_from: Option<BTreeSet<String>>,
    /// Sender deny list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_from: Option<BTreeSet<String>>,
    /// Subject allow list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_subject: Option<BTreeSet<String>>,
    /// Subject deny list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_subject: Option<BTreeSet<String>>,
    /// Folders freed wholesale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_dir: Option<BTreeSet<String>>,
    /// Folders locked wholesale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_dir: Option<BTreeSet<String>>,
}

impl Settings {
    /// Returns true when no setting is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        SettingName::ALL.into_iter().all(|name| !self.is_set(name))
    }

    /// Returns true when `name` is present, even as an empty set.
    #[must_use]
    pub const fn is_set(&self, name: SettingName) -> bool {
        match self.scalar(name) {
            Some(value) => value.is_some(),
            None => self.list_slot(name).is_some(),
        }
    }

    /// Entries of a set-valued setting; empty when absent or scalar.
    #[must_use]
    pub fn list(&self, name: SettingName) -> &BTreeSet<String> {
        self.list_slot(name).unwrap_or(&EMPTY)
    }

    /// Returns true if `value` is an entry of the set `name`.
    #[must_use]
    pub fn contains(&self, name: SettingName, value: &str) -> bool {
        self.list(name).contains(value)
    }

    /// Sets a scalar setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `name` is set-valued.
    pub fn set(&mut self, name: SettingName, value: impl Into<String>) -> Result<()> {
        let slot = self.scalar_mut(name).ok_or_else(|| {
            Error::Config(format!("{name} is a list, use + or - to modify it"))
        })?;
        *slot = Some(value.into());
        Ok(())
    }

    /// Adds an entry to a set-valued setting, creating the set if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `name` is scalar.
    pub fn add(&mut self, name: SettingName, value: impl Into<String>) -> Result<()> {
        let slot = self.list_mut(name)?;
        slot.get_or_insert_with(BTreeSet::new).insert(value.into());
        Ok(())
    }

    /// Removes an entry from a set-valued setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `name` is scalar or `value` is not in
    /// the set.
    pub fn remove(&mut self, name: SettingName, value: &str) -> Result<()> {
        let slot = self.list_mut(name)?;
        if slot.as_mut().is_some_and(|set| set.remove(value)) {
            Ok(())
        } else {
            Err(Error::Config(format!("{value} is not in {name}")))
        }
    }

    /// Deletes a setting entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the setting is not present.
    pub fn delete(&mut self, name: SettingName) -> Result<()> {
        let was_set = if name.is_list() {
            self.list_mut(name)?.take().is_some()
        } else {
            self.scalar_mut(name).and_then(Option::take).is_some()
        };
        if was_set {
            Ok(())
        } else {
            Err(Error::Config(format!("{name} is not set")))
        }
    }

    /// Text shown by the `config` command, `None` when absent.
    ///
    /// The password is masked; sets print as `{a, b}`.
    #[must_use]
    pub fn display_value(&self, name: SettingName) -> Option<String> {
        if name == SettingName::Password {
            return self.password.as_ref().map(|_| "...".to_string());
        }
        match self.scalar(name) {
            Some(value) => value.clone(),
            None => self.list_slot(name).map(|set| {
                let entries: Vec<&str> = set.iter().map(String::as_str).collect();
                format!("{{{}}}", entries.join(", "))
            }),
        }
    }

    /// Scalar slot for `name`, `None` for set-valued names.
    const fn scalar(&self, name: SettingName) -> Option<&Option<String>> {
        match name {
            SettingName::Server => Some(&self.server),
            SettingName::Login => Some(&self.login),
            SettingName::Password => Some(&self.password),
            _ => None,
        }
    }

    const fn scalar_mut(&mut self, name: SettingName) -> Option<&mut Option<String>> {
        match name {
            SettingName::Server => Some(&mut self.server),
            SettingName::Login => Some(&mut self.login),
            SettingName::Password => Some(&mut self.password),
            _ => None,
        }
    }

    const fn list_slot(&self, name: SettingName) -> Option<&BTreeSet<String>> {
        let slot = match name {
            SettingName::WhiteFrom => &self.white_from,
            SettingName::BlackFrom => &self.black_from,
            SettingName::WhiteSubject => &self.white_subject,
            SettingName::BlackSubject => &self.black_subject,
            SettingName::WhiteDir => &self.white_dir,
            SettingName::BlackDir => &self.black_dir,
            SettingName::Server | SettingName::Login | SettingName::Password => return None,
        };
        slot.as_ref()
    }

    fn list_mut(&mut self, name: SettingName) -> Result<&mut Option<BTreeSet<String>>> {
        match name {
            SettingName::WhiteFrom => Ok(&mut self.white_from),
            SettingName::BlackFrom => Ok(&mut self.black_from),
            SettingName::WhiteSubject => Ok(&mut self.white_subject),
            SettingName::BlackSubject => Ok(&mut self.black_subject),
            SettingName::WhiteDir => Ok(&mut self.white_dir),
            SettingName::BlackDir => Ok(&mut self.black_dir),
            SettingName::Server | SettingName::Login | SettingName::Password => {
                Err(Error::Config(format!("{name} is not a list")))
            }
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

    fn message(err: Error) -> String {
        err.to_string()
    }

    #[test]
    fn test_name_parsing() {
        assert_eq!("white_from".parse::<SettingName>().unwrap(), SettingName::WhiteFrom);
        assert_eq!("server".parse::<SettingName>().unwrap(), SettingName::Server);
        assert_eq!(
            message("colour".parse::<SettingName>().unwrap_err()),
            "Unknown config item: colour"
        );
        assert!("Server".parse::<SettingName>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for name in SettingName::ALL {
            assert_eq!(name.as_str().parse::<SettingName>().unwrap(), name);
        }
    }

    #[test]
    fn test_set_scalar() {
        let mut settings = Settings::default();
        settings.set(SettingName::Server, "imap.example.com").unwrap();
        settings.set(SettingName::Server, "imap.example.org:143").unwrap();
        assert_eq!(settings.server.as_deref(), Some("imap.example.org:143"));
    }

    #[test]
    fn test_set_on_list_is_rejected() {
        let mut settings = Settings::default();
        let err = settings.set(SettingName::WhiteFrom, "a@b.c").unwrap_err();
        assert_eq!(message(err), "white_from is a list, use + or - to modify it");
        assert!(settings.is_empty());
    }

    #[test]
    fn test_add_and_remove() {
        let mut settings = Settings::default();
        settings.add(SettingName::WhiteFrom, "*@trusted.com").unwrap();
        settings.add(SettingName::WhiteFrom, "*@trusted.com").unwrap();
        settings.add(SettingName::WhiteFrom, "alice@example.com").unwrap();
        assert_eq!(settings.list(SettingName::WhiteFrom).len(), 2);
        assert!(settings.contains(SettingName::WhiteFrom, "alice@example.com"));

        settings.remove(SettingName::WhiteFrom, "alice@example.com").unwrap();
        assert!(!settings.contains(SettingName::WhiteFrom, "alice@example.com"));
    }

    #[test]
    fn test_remove_absent_entry() {
        let mut settings = Settings::default();
        let err = settings.remove(SettingName::BlackDir, "Spam").unwrap_err();
        assert_eq!(message(err), "Spam is not in black_dir");
    }

    #[test]
    fn test_list_ops_on_scalar() {
        let mut settings = Settings::default();
        assert_eq!(
            message(settings.add(SettingName::Login, "me").unwrap_err()),
            "login is not a list"
        );
        assert_eq!(
            message(settings.remove(SettingName::Login, "me").unwrap_err()),
            "login is not a list"
        );
    }

    #[test]
    fn test_delete() {
        let mut settings = Settings::default();
        settings.set(SettingName::Login, "me").unwrap();
        settings.add(SettingName::BlackDir, "Spam").unwrap();

        settings.delete(SettingName::Login).unwrap();
        settings.delete(SettingName::BlackDir).unwrap();
        assert!(settings.is_empty());

        assert_eq!(
            message(settings.delete(SettingName::Login).unwrap_err()),
            "login is not set"
        );
    }

    #[test]
    fn test_absent_list_reads_empty() {
        let settings = Settings::default();
        assert!(settings.list(SettingName::BlackFrom).is_empty());
        assert!(settings.list(SettingName::Server).is_empty());
        assert!(!settings.contains(SettingName::WhiteDir, "INBOX"));
    }

    #[test]
    fn test_emptied_set_is_still_present() {
        let mut settings = Settings::default();
        settings.add(SettingName::WhiteDir, "INBOX").unwrap();
        settings.remove(SettingName::WhiteDir, "INBOX").unwrap();
        assert!(!settings.is_empty());
        assert_eq!(
            settings.display_value(SettingName::WhiteDir).as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_display_values() {
        let mut settings = Settings::default();
        settings.set(SettingName::Password, "secret").unwrap();
        settings.add(SettingName::WhiteFrom, "b@x").unwrap();
        settings.add(SettingName::WhiteFrom, "a@x").unwrap();

        assert_eq!(settings.display_value(SettingName::Password).as_deref(), Some("..."));
        assert_eq!(
            settings.display_value(SettingName::WhiteFrom).as_deref(),
            Some("{a@x, b@x}")
        );
        assert_eq!(settings.display_value(SettingName::Server), None);
    }
}
