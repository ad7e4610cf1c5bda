//! Greeting and login.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use super::Client;
use super::states::{Authenticated, NotAuthenticated};
use crate::command::{Command, TagGenerator};
use crate::connection::framed::FramedStream;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode, Status};
use crate::{Error, Result};

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Waits for the server greeting on a freshly opened stream.
    ///
    /// Capabilities announced in the greeting are remembered. `read_timeout`
    /// bounds this and every later read.
    pub async fn from_stream(stream: S, read_timeout: Duration) -> Result<Self> {
        let mut framed = FramedStream::new(stream, read_timeout);
        let greeting = ResponseParser::parse(&framed.read_response().await?)?;
        let capabilities = greeting_capabilities(greeting)?;
        Ok(Self {
            stream: framed,
            tag_gen: TagGenerator::default(),
            capabilities,
            state: NotAuthenticated,
        })
    }

    /// Logs in with a plain LOGIN. A refused login drops the connection.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        if self.login_disabled() {
            return Err(Error::Protocol(
                "server advertises LOGINDISABLED".to_string(),
            ));
        }
        let login = Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.execute(&login).await?;
        info!(username, "logged in");
        Ok(self.transition(Authenticated))
    }
}

/// `OK` and `PREAUTH` greet, `BYE` refuses the connection, anything else is
/// a protocol error.
fn greeting_capabilities(greeting: Response) -> Result<Vec<Capability>> {
    let (status, code, text) = match greeting {
        Response::Untagged(UntaggedResponse::Status { status, code, text }) => (status, code, text),
        other => return Err(Error::Protocol(format!("unexpected greeting: {other:?}"))),
    };
    match (status, code) {
        (Status::Bye, _) => Err(Error::Bye(text)),
        (Status::Ok | Status::PreAuth, Some(ResponseCode::Capability(caps))) => Ok(caps),
        (Status::Ok | Status::PreAuth, _) => Ok(Vec::new()),
        (other, _) => Err(Error::Protocol(format!("unexpected greeting status {other:?}"))),
    }
}
