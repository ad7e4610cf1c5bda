//! Implementation for the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::states::{Authenticated, Selected};
use super::{Client, Completion};
use crate::command::Command;
use crate::parser::UntaggedResponse;
use crate::types::{ListResponse, Mailbox, MailboxStatus, ResponseCode};
use crate::Result;

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Examines a mailbox for read-only access.
    ///
    /// Consumes self and returns a selected client on success. On a refusal
    /// the connection is lost with `self`; use [`Self::try_examine`] to keep
    /// it.
    pub async fn examine(self, mailbox: &str) -> Result<(Client<S, Selected>, MailboxStatus)> {
        match self.try_examine(mailbox).await {
            Ok(Ok(selected)) => Ok(selected),
            Ok(Err((_, err))) | Err(err) => Err(err),
        }
    }

    /// Examines a mailbox, handing the authenticated client back when the
    /// server refuses (NO/BAD) so the session can continue.
    ///
    /// The outer `Err` is for failures that end the session.
    #[allow(clippy::type_complexity)]
    pub async fn try_examine(
        mut self,
        mailbox: &str,
    ) -> Result<std::result::Result<(Client<S, Selected>, MailboxStatus), (Self, crate::Error)>>
    {
        let mailbox = Mailbox::new(mailbox);
        match self
            .execute(&Command::Examine {
                mailbox: mailbox.clone(),
            })
            .await
        {
            Ok(completion) => Ok(Ok(self.enter(mailbox, &completion))),
            Err(err) if err.is_refusal() => Ok(Err((self, err))),
            Err(err) => Err(err),
        }
    }

    /// Lists mailboxes matching a pattern.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        let completion = self
            .execute(&Command::List {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?;

        Ok(completion
            .untagged
            .into_iter()
            .filter_map(|response| match response {
                UntaggedResponse::List(item) => Some(item),
                _ => None,
            })
            .collect())
    }

    fn enter(self, mailbox: Mailbox, completion: &Completion) -> (Client<S, Selected>, MailboxStatus) {
        let status = parse_mailbox_status(completion);
        debug!(mailbox = %mailbox, exists = status.exists, read_only = status.read_only, "opened");
        let client = self.transition(Selected::new(mailbox, status.clone()));
        (client, status)
    }
}

/// Builds a mailbox status from the EXAMINE responses.
pub(super) fn parse_mailbox_status(completion: &Completion) -> MailboxStatus {
    let mut status = MailboxStatus {
        read_only: completion
            .code
            .as_ref()
            .is_some_and(ResponseCode::is_read_only),
        ..MailboxStatus::default()
    };

    for response in &completion.untagged {
        match response {
            UntaggedResponse::Exists(n) => status.exists = *n,
            UntaggedResponse::Recent(n) => status.recent = *n,
            _ => {}
        }
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_examine_responses() {
        let completion = Completion {
            untagged: vec![
                UntaggedResponse::Flags(vec!["\\Seen".to_string()]),
                UntaggedResponse::Exists(17),
                UntaggedResponse::Recent(2),
            ],
            code: Some(ResponseCode::ReadOnly),
        };
        assert_eq!(
            parse_mailbox_status(&completion),
            MailboxStatus {
                exists: 17,
                recent: 2,
                read_only: true,
            }
        );
    }

    #[test]
    fn status_defaults_to_empty_read_write() {
        assert_eq!(
            parse_mailbox_status(&Completion::default()),
            MailboxStatus::default()
        );
    }
}
