//! Conversation transport seam
//!
//! A `Session` is the only way the command core talks to the operator. The
//! chat platform, the console front end and the tests each provide one.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::prompt::{PromptLoop, PromptOutcome};

#[async_trait]
pub trait Session: Send + Sync {
    /// Send `text` and wait at most `timeout` for one reply.
    ///
    /// # Errors
    ///
    /// `TimedOut` when the deadline passes, `Transport` when the channel to
    /// the operator fails.
    async fn prompt(&self, text: &str, timeout: Duration) -> Result<String>;

    /// Send a message without waiting for a reply.
    ///
    /// # Errors
    ///
    /// `Transport` when the message cannot be delivered.
    async fn send(&self, text: &str) -> Result<()>;

    /// Show a numbered menu and return the zero-based index picked.
    ///
    /// The default renders `options` as a numbered list and re-asks on any
    /// reply that is not a listed number. `c` cancels.
    ///
    /// # Errors
    ///
    /// `Cancelled` or `TimedOut` from the underlying prompt.
    async fn disambiguate(
        &self,
        title: &str,
        options: &[String],
        timeout: Duration,
    ) -> Result<usize> {
        let mut menu = String::from(title);
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("\n{}. {}", i + 1, option));
        }
        menu.push_str("\nReply with the number of your selection, or `c` to cancel.");

        let count = options.len();
        let outcome = PromptLoop::new(self, timeout)
            .ask(&menu, |reply| async move {
                match reply.parse::<usize>() {
                    Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
                    _ => Err(ExError::new(ExErrorKind::NotFound)
                        .with_op("disambiguate")
                        .with_message(format!(
                            "Please reply with a number between 1 and {}.",
                            count
                        ))),
                }
            })
            .await?;

        match outcome {
            PromptOutcome::Value(index) => Ok(index),
            PromptOutcome::Skipped => Err(ExError::new(ExErrorKind::Internal)
                .with_op("disambiguate")
                .with_message("selection prompt has no skip token")),
        }
    }
}

/// Session that replays a fixed script of replies
///
/// A `None` entry, or running out of entries, behaves like the operator not
/// answering before the deadline. Prompts, their deadlines and sent messages
/// are recorded so tests can assert on the conversation.
#[derive(Default)]
pub struct ScriptedSession {
    replies: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
    timeouts: Mutex<Vec<Duration>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Some(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Append a reply that never arrives
    pub fn then_silence(self) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(None);
        }
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Deadline passed with each prompt, in prompt order
    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn prompt(&self, text: &str, timeout: Duration) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(text.to_string());
        }
        if let Ok(mut timeouts) = self.timeouts.lock() {
            timeouts.push(timeout);
        }
        let next = self
            .replies
            .lock()
            .map_err(|_| ExError::new(ExErrorKind::Internal).with_message("script poisoned"))?
            .pop_front()
            .flatten();
        next.ok_or_else(|| {
            ExError::new(ExErrorKind::TimedOut)
                .with_op("prompt")
                .with_message("no reply before the deadline")
        })
    }

    async fn send(&self, text: &str) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(())
    }
}
