//! The client, one type per protocol state.
//!
//! `Client<S, NotAuthenticated>` can only log in, `Client<S, Authenticated>`
//! can list and open folders, `Client<S, Selected>` can search, fetch and
//! close. Every transition consumes the old value.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode, Status};
use crate::{Error, Result};

/// A connection in protocol state `State`.
pub struct Client<S, State> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) state: State,
}

/// Result of a successful command.
#[derive(Debug, Default)]
pub(crate) struct Completion {
    /// Untagged data received before the tagged `OK`.
    pub(crate) untagged: Vec<UntaggedResponse>,
    /// Bracketed code of the tagged `OK`, if any.
    pub(crate) code: Option<ResponseCode>,
}

impl<S, State: fmt::Debug> fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .field("capabilities", &self.capabilities)
            .field("tags_sent", &self.tag_gen.current())
            .finish_non_exhaustive()
    }
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Capabilities seen so far, from the greeting or later responses.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Whether `cap` has been advertised.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Whether LIST reports RFC 6154 folder roles.
    #[must_use]
    pub fn supports_special_use(&self) -> bool {
        self.has_capability(&Capability::SpecialUse)
    }

    /// Whether the server forbids plain LOGIN.
    #[must_use]
    pub fn login_disabled(&self) -> bool {
        self.has_capability(&Capability::LoginDisabled)
    }

    pub(crate) fn transition<Next>(self, state: Next) -> Client<S, Next> {
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            state,
        }
    }

    /// Sends `command` and gathers responses until its tagged completion.
    ///
    /// `NO` and `BAD` map to [`Error::No`] and [`Error::Bad`], an untagged
    /// `BYE` to [`Error::Bye`].
    pub(crate) async fn execute(&mut self, command: &Command) -> Result<Completion> {
        let tag = self.tag_gen.next();
        debug!(%tag, command = %command.redacted(), "sending");
        self.stream.write_command(&command.serialize(&tag)).await?;

        let mut untagged = Vec::new();
        loop {
            let raw = self.stream.read_response().await?;
            trace!(len = raw.len(), "received");
            match ResponseParser::parse(&raw)? {
                Response::Tagged {
                    tag: got,
                    status,
                    code,
                    text,
                } => {
                    if got.as_str() != tag {
                        return Err(Error::Protocol(format!(
                            "unexpected tag {got}, waiting for {tag}"
                        )));
                    }
                    return self.complete(status, code, text, untagged);
                }
                Response::Untagged(data) => {
                    if let Some(data) = self.absorb(data)? {
                        untagged.push(data);
                    }
                }
                Response::Continuation { .. } => {
                    return Err(Error::Protocol(
                        "unexpected continuation request".to_string(),
                    ));
                }
            }
        }
    }

    /// Handles untagged data the client itself cares about. Returns what is
    /// left for the caller.
    fn absorb(&mut self, data: UntaggedResponse) -> Result<Option<UntaggedResponse>> {
        match data {
            UntaggedResponse::Status {
                status: Status::Bye,
                text,
                ..
            } => Err(Error::Bye(text)),
            UntaggedResponse::Capability(caps) => {
                self.capabilities = caps;
                Ok(None)
            }
            other => Ok(Some(other)),
        }
    }

    fn complete(
        &mut self,
        status: Status,
        code: Option<ResponseCode>,
        text: String,
        untagged: Vec<UntaggedResponse>,
    ) -> Result<Completion> {
        if let Some(ResponseCode::Capability(caps)) = &code {
            self.capabilities.clone_from(caps);
        }
        match status {
            Status::Ok => Ok(Completion { untagged, code }),
            Status::No => Err(Error::No(text)),
            Status::Bad => Err(Error::Bad(text)),
            Status::PreAuth | Status::Bye => Err(Error::Protocol(format!(
                "{status:?} is not a valid command completion"
            ))),
        }
    }

    /// Sends LOGOUT and shuts the socket down. The server's reply is not
    /// checked.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.tag_gen.next();
        debug!(%tag, "LOGOUT");
        self.stream
            .write_command(&Command::Logout.serialize(&tag))
            .await?;
        let _ = self.stream.read_until_tagged(&tag).await;
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}
