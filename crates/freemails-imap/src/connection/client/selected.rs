//! Implementation for the selected state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::{Authenticated, Selected};
use crate::command::{Command, FetchAttribute, SearchCriteria};
use crate::parser::{FetchItem, UntaggedResponse};
use crate::types::{MailboxStatus, SeqNum};
use crate::Result;

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the name of the open mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        self.state.mailbox()
    }

    /// Returns the status reported when the mailbox was opened, updated by
    /// EXISTS responses seen since.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        self.state.status()
    }

    /// Closes the current mailbox and returns to authenticated state.
    ///
    /// After EXAMINE nothing is expunged. On a refusal the connection is
    /// lost with `self`; use [`Self::try_close`] to keep it.
    pub async fn close(self) -> Result<Client<S, Authenticated>> {
        match self.try_close().await {
            Ok(Ok(client)) => Ok(client),
            Ok(Err((_, err))) | Err(err) => Err(err),
        }
    }

    /// Closes the mailbox, handing the selected client back when the server
    /// refuses (NO/BAD) so it can still log out or try again.
    ///
    /// The outer `Err` is for failures that end the session.
    pub async fn try_close(
        mut self,
    ) -> Result<std::result::Result<Client<S, Authenticated>, (Self, crate::Error)>> {
        match self.execute(&Command::Close).await {
            Ok(_) => Ok(Ok(self.transition(Authenticated))),
            Err(err) if err.is_refusal() => Ok(Err((self, err))),
            Err(err) => Err(err),
        }
    }

    /// Searches for messages matching all of the given criteria; an empty
    /// slice searches `ALL`.
    pub async fn search(&mut self, criteria: &[SearchCriteria]) -> Result<Vec<SeqNum>> {
        let completion = self
            .execute(&Command::Search {
                criteria: criteria.to_vec(),
            })
            .await?;

        let mut results = Vec::new();
        for response in completion.untagged {
            match response {
                UntaggedResponse::Search(ids) => results.extend(ids),
                UntaggedResponse::Exists(n) => self.state.status.exists = n,
                _ => {}
            }
        }
        Ok(results)
    }

    /// Fetches data items for one message.
    ///
    /// Unsolicited FETCH responses for other messages are ignored; an empty
    /// vector means the server sent nothing for `sequence`.
    pub async fn fetch(
        &mut self,
        sequence: SeqNum,
        items: Vec<FetchAttribute>,
    ) -> Result<Vec<FetchItem>> {
        let completion = self.execute(&Command::Fetch { sequence, items }).await?;

        let mut result = Vec::new();
        for response in completion.untagged {
            match response {
                UntaggedResponse::Fetch { seq, items } if seq == sequence => {
                    result.extend(items);
                }
                UntaggedResponse::Exists(n) => self.state.status.exists = n,
                _ => {}
            }
        }
        Ok(result)
    }

    /// Fetches the header block of one message with `BODY.PEEK[HEADER]`,
    /// leaving its `\Seen` flag untouched.
    ///
    /// Returns `None` when the server sent no header data.
    pub async fn fetch_header(&mut self, sequence: SeqNum) -> Result<Option<Vec<u8>>> {
        let items = self
            .fetch(sequence, vec![FetchAttribute::header_peek()])
            .await?;

        Ok(items.into_iter().find_map(|item| match item {
            FetchItem::Body { section, data } if section.as_deref() == Some("HEADER") => data,
            _ => None,
        }))
    }
}
