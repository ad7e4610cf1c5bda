//! User settings.
//!
//! [`Settings`] is the typed record of everything the user can configure;
//! [`SettingName`] validates names coming from the command line before any
//! operation touches the record. [`SettingsStore`] persists it as JSON.

mod model;
mod store;

pub use model::{SettingName, Settings};
pub use store::{CONFIG_ENV, SettingsStore};
