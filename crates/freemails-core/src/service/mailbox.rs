//! IMAP-backed [`MailSource`].
//!
//! Folders are opened with EXAMINE and headers fetched with
//! `BODY.PEEK[HEADER]`, so scanning never changes flags or expunges.

use freemails_imap::connection::connect;
use freemails_imap::{
    Authenticated, Client, Config, ImapStream, SearchCriteria, Selected, SeqNum,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::scanner::{Folder, MailSource, ScanOptions, ScanSink, ScanSummary, scan};
use crate::{Error, Result};

/// Client state held between calls.
enum Session<S> {
    Authenticated(Client<S, Authenticated>),
    Selected(Client<S, Selected>),
    /// Dropped after a failure that ended the connection.
    Closed,
}

/// A logged-in mailbox, with at most one folder open.
pub struct ImapMailbox<S = ImapStream> {
    session: Session<S>,
}

impl<S> std::fmt::Debug for ImapMailbox<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.session {
            Session::Authenticated(_) => "authenticated",
            Session::Selected(_) => "selected",
            Session::Closed => "closed",
        };
        f.debug_struct("ImapMailbox").field("session", &state).finish()
    }
}

impl ImapMailbox<ImapStream> {
    /// Connects to the configured server and logs in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSetting`] if `server`, `login` or `password`
    /// is not set, or the IMAP error if connecting or logging in fails. A
    /// failed login drops the connection.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let server = settings
            .server
            .as_deref()
            .ok_or(Error::MissingSetting("server"))?;
        let login = settings
            .login
            .as_deref()
            .ok_or(Error::MissingSetting("login"))?;
        let password = settings
            .password
            .as_deref()
            .ok_or(Error::MissingSetting("password"))?;

        let config = Config::from_server(server)?;
        info!(host = %config.host, port = config.port, "Connecting");

        let stream = connect(&config).await?;
        let client = Client::from_stream(stream, config.io_timeout).await?;
        let client = client.login(login, password).await?;
        info!(login, "Logged in");

        Ok(Self::from_client(client))
    }
}

impl<S> ImapMailbox<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already authenticated client.
    #[must_use]
    pub const fn from_client(client: Client<S, Authenticated>) -> Self {
        Self {
            session: Session::Authenticated(client),
        }
    }

    /// Name of the open folder, if any.
    #[must_use]
    pub fn current_folder(&self) -> Option<&str> {
        match &self.session {
            Session::Selected(client) => Some(client.mailbox()),
            _ => None,
        }
    }

    /// Closes the open folder, if any, and logs out. A refused CLOSE is
    /// logged and LOGOUT is sent anyway.
    ///
    /// # Errors
    ///
    /// Returns the IMAP error if the connection fails during CLOSE or
    /// LOGOUT.
    pub async fn close(self) -> Result<()> {
        match self.session {
            Session::Authenticated(client) => client.logout().await?,
            Session::Selected(client) => {
                debug!(folder = client.mailbox(), "Closing folder");
                match client.try_close().await? {
                    Ok(client) => client.logout().await?,
                    Err((client, err)) => {
                        warn!(folder = client.mailbox(), error = %err, "CLOSE refused, logging out");
                        client.logout().await?;
                    }
                }
            }
            Session::Closed => return Ok(()),
        }
        info!("Logged out");
        Ok(())
    }

    /// Takes the client back to the authenticated state, closing the open
    /// folder. The session is left [`Session::Closed`] until put back, except
    /// when CLOSE is refused: the folder then stays open and the refusal is
    /// returned.
    async fn take_authenticated(&mut self) -> Result<Client<S, Authenticated>> {
        match std::mem::replace(&mut self.session, Session::Closed) {
            Session::Authenticated(client) => Ok(client),
            Session::Selected(client) => match client.try_close().await? {
                Ok(client) => Ok(client),
                Err((client, err)) => {
                    self.session = Session::Selected(client);
                    Err(err.into())
                }
            },
            Session::Closed => Err(Error::Session("connection closed")),
        }
    }

    fn selected(&mut self) -> Result<&mut Client<S, Selected>> {
        match &mut self.session {
            Session::Selected(client) => Ok(client),
            Session::Authenticated(_) => Err(Error::Session("no folder open")),
            Session::Closed => Err(Error::Session("connection closed")),
        }
    }
}

impl<S> MailSource for ImapMailbox<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn list_folders(&mut self) -> Result<Vec<Folder>> {
        let mut client = self.take_authenticated().await?;
        let listed = client.list("", "*").await;
        self.session = Session::Authenticated(client);

        let folders: Vec<Folder> = listed?
            .into_iter()
            .map(|entry| Folder {
                name: entry.mailbox.as_str().to_string(),
                attributes: entry.attributes,
            })
            .collect();
        debug!(count = folders.len(), "Listed folders");
        Ok(folders)
    }

    async fn examine(&mut self, folder: &str) -> Result<u32> {
        let client = self.take_authenticated().await?;
        match client.try_examine(folder).await? {
            Ok((client, status)) => {
                debug!(folder, exists = status.exists, "Folder open");
                self.session = Session::Selected(client);
                Ok(status.exists)
            }
            Err((client, err)) => {
                self.session = Session::Authenticated(client);
                Err(err.into())
            }
        }
    }

    async fn search(&mut self, criteria: &[SearchCriteria]) -> Result<Vec<SeqNum>> {
        Ok(self.selected()?.search(criteria).await?)
    }

    async fn fetch_header(&mut self, sequence: SeqNum) -> Result<Option<Vec<u8>>> {
        Ok(self.selected()?.fetch_header(sequence).await?)
    }
}

/// Scans `mailbox`, then closes it whatever the scan result.
///
/// # Errors
///
/// Returns the scan error if any, otherwise the error from closing.
pub async fn scan_mailbox<S, K>(
    mut mailbox: ImapMailbox<S>,
    settings: &Settings,
    options: &ScanOptions,
    sink: &mut K,
) -> Result<ScanSummary>
where
    S: AsyncRead + AsyncWrite + Unpin,
    K: ScanSink,
{
    let scanned = scan(&mut mailbox, settings, options, sink).await;
    let closed = mailbox.close().await;

    match (scanned, closed) {
        (Ok(summary), closed) => closed.map(|()| summary),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "Logout after failed scan also failed");
            Err(err)
        }
    }
}

/// Connects with `settings`, scans every folder and logs out.
///
/// # Errors
///
/// Returns an error if the session cannot be opened or the scan fails.
pub async fn list_mailbox<K: ScanSink>(
    settings: &Settings,
    options: &ScanOptions,
    sink: &mut K,
) -> Result<ScanSummary> {
    let mailbox = ImapMailbox::connect(settings).await?;
    scan_mailbox(mailbox, settings, options, sink).await
}
