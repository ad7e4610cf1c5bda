//! JSON persistence for [`Settings`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Settings;
use crate::{Error, Result};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "FREEMAILS_CONFIG";

/// Location of the settings file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store for an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `$FREEMAILS_CONFIG`, or at
    /// `<config dir>/freemails/config.json` when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no configuration directory.
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::new(path));
        }
        Self::default_path().map(Self::new)
    }

    /// Default settings file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no configuration directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("freemails").join("config.json"))
            .ok_or_else(|| Error::Config("Cannot locate the configuration directory".to_string()))
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings; a missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON for
    /// [`Settings`].
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No settings file");
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), "Settings loaded");
        Ok(settings)
    }

    /// Writes settings, creating the parent directory if needed.
    ///
    /// On Unix the file is only readable by its owner since it holds the
    /// password.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut contents = serde_json::to_string_pretty(settings)?;
        contents.push('\n');

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(contents.as_bytes())?;

        // `mode` only applies on creation.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %self.path.display(), "Settings saved");
        Ok(())
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
    use crate::SettingName;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("config.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested").join("config.json"));

        let mut settings = Settings::default();
        settings.set(SettingName::Server, "imap.example.com").unwrap();
        settings.add(SettingName::BlackFrom, "spam@example.com").unwrap();
        settings.add(SettingName::WhiteDir, "Newsletters").unwrap();

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_sets_are_sorted_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("config.json"));

        let mut settings = Settings::default();
        settings.add(SettingName::WhiteSubject, "zeta").unwrap();
        settings.add(SettingName::WhiteSubject, "alpha").unwrap();
        store.save(&settings).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "white_subject": ["alpha", "zeta"] }));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"server": "x", "colour": "blue"}"#).unwrap();

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Serde(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        SettingsStore::new(&path).save(&Settings::default()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_default_path_layout() {
        if let Ok(path) = SettingsStore::default_path() {
            assert!(path.ends_with("freemails/config.json"));
        }
    }
}
