//! Runs parsed arguments against the settings and the mailbox.

use std::io::{self, Write};

use anyhow::{Context, Result};
use freemails_core::{ScanOptions, SettingName, Settings, SettingsStore, list_mailbox};
use tracing::{debug, info};

use crate::cli::{Action, USAGE};
use crate::output::Printer;

/// Source of passwords typed by the user.
pub trait PasswordPrompt {
    /// Reads a password without echoing it.
    fn read_password(&mut self) -> io::Result<String>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct Terminal;

impl PasswordPrompt for Terminal {
    fn read_password(&mut self) -> io::Result<String> {
        rpassword::prompt_password("Password: ")
    }
}

impl<F> PasswordPrompt for F
where
    F: FnMut() -> io::Result<String>,
{
    fn read_password(&mut self) -> io::Result<String> {
        self()
    }
}

/// State of one invocation.
///
/// Settings are loaded on first use and written back by
/// [`Session::finish`] only if an argument changed them.
pub struct Session<W, P> {
    store: SettingsStore,
    settings: Option<Settings>,
    modified: bool,
    options: ScanOptions,
    out: W,
    prompt: P,
}

impl<W: Write, P: PasswordPrompt> Session<W, P> {
    pub fn new(store: SettingsStore, out: W, prompt: P) -> Self {
        Self {
            store,
            settings: None,
            modified: false,
            options: ScanOptions::default(),
            out,
            prompt,
        }
    }

    /// Processes every argument in order; no arguments means `config`.
    pub async fn run_all(&mut self, args: &[String]) -> Result<()> {
        if args.is_empty() {
            return self.run(Action::Config).await;
        }
        for arg in args {
            let action = Action::parse(arg)?;
            self.run(action).await?;
        }
        Ok(())
    }

    /// Runs one action.
    pub async fn run(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Set(name, value) => {
                let value = match value {
                    Some(value) => value,
                    None => self.ask_password()?,
                };
                self.settings()?.set(name, value)?;
                self.modified = true;
            }
            Action::Add(name, value) => {
                self.settings()?.add(name, value)?;
                self.modified = true;
            }
            Action::Remove(name, value) => {
                self.settings()?.remove(name, &value)?;
                self.modified = true;
            }
            Action::Delete(name) => {
                self.settings()?.delete(name)?;
                self.modified = true;
            }
            Action::PromptPassword => {
                let password = self.ask_password()?;
                self.settings()?.set(SettingName::Password, password)?;
                self.modified = true;
            }
            Action::Help => writeln!(self.out, "{USAGE}")?,
            Action::Config => self.show_config()?,
            Action::List => self.list().await?,
        }
        Ok(())
    }

    /// Saves the settings if they were changed.
    pub fn finish(self) -> Result<()> {
        match self.settings {
            Some(settings) if self.modified => {
                self.store.save(&settings).with_context(|| {
                    format!("Cannot write {}", self.store.path().display())
                })?;
            }
            _ => debug!("Settings unchanged"),
        }
        Ok(())
    }

    fn settings(&mut self) -> Result<&mut Settings> {
        Self::load(&mut self.settings, &self.store)
    }

    fn load<'a>(slot: &'a mut Option<Settings>, store: &SettingsStore) -> Result<&'a mut Settings> {
        if slot.is_none() {
            let settings = store
                .load()
                .with_context(|| format!("Cannot read {}", store.path().display()))?;
            *slot = Some(settings);
        }
        Ok(slot.get_or_insert_with(Settings::default))
    }

    fn ask_password(&mut self) -> Result<String> {
        self.prompt
            .read_password()
            .context("Cannot read password")
    }

    fn show_config(&mut self) -> Result<()> {
        let settings = Self::load(&mut self.settings, &self.store)?;
        if settings.is_empty() {
            writeln!(self.out, "No configuration")?;
            return Ok(());
        }
        for name in SettingName::ALL {
            if let Some(value) = settings.display_value(name) {
                writeln!(self.out, "{name} = {value}")?;
            }
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<()> {
        let settings = Self::load(&mut self.settings, &self.store)?;
        let mut printer = Printer::new(&mut self.out);
        let summary = list_mailbox(settings, &self.options, &mut printer).await?;
        printer.finish()?;
        info!(?summary, "Listing done");
        Ok(())
    }
}

/// Runs `args` and persists the settings if everything succeeded.
pub async fn execute<W: Write, P: PasswordPrompt>(
    args: &[String],
    store: SettingsStore,
    out: W,
    prompt: P,
) -> Result<()> {
    let mut session = Session::new(store, out, prompt);
    session.run_all(args).await?;
    session.finish()
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

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn no_prompt() -> io::Result<String> {
        panic!("unexpected password prompt")
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: SettingsStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::new(dir.path().join("freemails").join("config.json"));
            Self { _dir: dir, store }
        }

        async fn run(&self, list: &[&str]) -> (Result<()>, String) {
            let mut out = Vec::new();
            let result = execute(&args(list), self.store.clone(), &mut out, no_prompt).await;
            (result, String::from_utf8(out).unwrap())
        }
    }

    #[tokio::test]
    async fn test_default_is_config() {
        let fixture = Fixture::new();
        let (result, out) = fixture.run(&[]).await;
        result.unwrap();
        assert_eq!(out, "No configuration\n");
        assert!(!fixture.store.path().exists());
    }

    #[tokio::test]
    async fn test_changes_are_saved() {
        let fixture = Fixture::new();
        let (result, _) = fixture
            .run(&[
                "server=imap.example.com",
                "login=me",
                "password=secret",
                "+white_from=*@trusted.com",
                "+white_from=alice@example.com",
            ])
            .await;
        result.unwrap();

        let (result, out) = fixture.run(&["config"]).await;
        result.unwrap();
        assert_eq!(
            out,
            "server = imap.example.com\n\
             login = me\n\
             password = ...\n\
             white_from = {*@trusted.com, alice@example.com}\n"
        );
    }

    #[tokio::test]
    async fn test_failed_run_saves_nothing() {
        let fixture = Fixture::new();
        let (result, _) = fixture.run(&["server=imap.example.com", "frobnicate"]).await;
        assert_eq!(result.unwrap_err().to_string(), "Unknown command: frobnicate");
        assert!(!fixture.store.path().exists());

        let (result, _) = fixture.run(&["server=x", "white_from=a@b.c"]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "white_from is a list, use + or - to modify it"
        );
        assert!(!fixture.store.path().exists());
    }

    #[tokio::test]
    async fn test_earlier_arguments_run_before_an_error() {
        let fixture = Fixture::new();
        let (result, out) = fixture.run(&["config", "-server"]).await;
        assert_eq!(result.unwrap_err().to_string(), "server is not set");
        assert_eq!(out, "No configuration\n");
    }

    #[tokio::test]
    async fn test_help_continues() {
        let fixture = Fixture::new();
        let (result, out) = fixture.run(&["-h", "config"]).await;
        result.unwrap();
        assert!(out.starts_with("Usage: freemails"));
        assert!(out.ends_with("No configuration\n"));
    }

    #[tokio::test]
    async fn test_delete_and_remove() {
        let fixture = Fixture::new();
        fixture
            .run(&["login=me", "+black_dir=Spam", "+black_dir=Promotions"])
            .await
            .0
            .unwrap();
        fixture.run(&["-login", "-black_dir=Spam"]).await.0.unwrap();

        let settings = fixture.store.load().unwrap();
        assert_eq!(settings.login, None);
        assert_eq!(
            settings.list(SettingName::BlackDir).iter().collect::<Vec<_>>(),
            vec!["Promotions"]
        );
    }

    #[tokio::test]
    async fn test_config_does_not_write() {
        let fixture = Fixture::new();
        fixture.run(&["login=me"]).await.0.unwrap();
        let before = std::fs::metadata(fixture.store.path()).unwrap().modified().unwrap();

        fixture.run(&["config", "help"]).await.0.unwrap();
        let after = std::fs::metadata(fixture.store.path()).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_password_prompt() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut prompts = 0;
        let prompt = || -> io::Result<String> {
            prompts += 1;
            Ok(format!("typed-{prompts}"))
        };
        execute(&args(&["password=", "password"]), fixture.store.clone(), &mut out, prompt)
            .await
            .unwrap();

        assert_eq!(fixture.store.load().unwrap().password.as_deref(), Some("typed-2"));
    }

    #[tokio::test]
    async fn test_list_needs_server() {
        let fixture = Fixture::new();
        let (result, out) = fixture.run(&["list"]).await;
        assert!(result.unwrap_err().to_string().starts_with("Missing setting: server"));
        assert!(out.is_empty());
    }
}
