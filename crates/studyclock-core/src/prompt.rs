//! Ask-and-validate loop shared by every interactive step
//!
//! The loop is the only place a failure is retried: a validator returning a
//! recoverable error (`NotFound`) gets its message relayed to the operator
//! and the prompt is asked again. Cancel and skip tokens end the loop early,
//! and a timeout ends it without retry.

use std::future::Future;
use std::time::Duration;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::session::Session;

/// Reply that aborts the surrounding conversation
pub const CANCEL_TOKEN: &str = "c";
/// Reply that leaves an optional field empty
pub const SKIP_TOKEN: &str = "s";

/// Non-error result of one prompt loop
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome<T> {
    Value(T),
    /// The operator replied with the skip token
    Skipped,
}

impl<T> PromptOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            PromptOutcome::Value(v) => Some(v),
            PromptOutcome::Skipped => None,
        }
    }
}

pub struct PromptLoop<'a, S: Session + ?Sized> {
    session: &'a S,
    timeout: Duration,
    cancel_token: String,
    skip_token: Option<String>,
}

impl<'a, S: Session + ?Sized> PromptLoop<'a, S> {
    /// A loop with the default cancel token and no skip token
    pub fn new(session: &'a S, timeout: Duration) -> Self {
        Self {
            session,
            timeout,
            cancel_token: CANCEL_TOKEN.to_string(),
            skip_token: None,
        }
    }

    pub fn with_skip_token(mut self, token: impl Into<String>) -> Self {
        self.skip_token = Some(token.into());
        self
    }

    /// Ask `prompt` until `validate` accepts a reply.
    ///
    /// Replies are trimmed before token comparison (case-insensitive) and
    /// before validation. Blank replies are ignored and the prompt repeats.
    ///
    /// # Errors
    ///
    /// `Cancelled` on the cancel token, `TimedOut` from the session, and any
    /// non-recoverable error returned by `validate`.
    pub async fn ask<T, F, Fut>(&self, prompt: &str, mut validate: F) -> Result<PromptOutcome<T>>
    where
        T: Send,
        F: FnMut(String) -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let reply = self.session.prompt(prompt, self.timeout).await?;
            let reply = reply.trim();

            if reply.is_empty() {
                tracing::debug!(attempt, "blank reply, asking again");
                continue;
            }
            if reply.eq_ignore_ascii_case(&self.cancel_token) {
                return Err(ExError::new(ExErrorKind::Cancelled)
                    .with_op("prompt")
                    .with_message("operator cancelled"));
            }
            if let Some(skip) = &self.skip_token {
                if reply.eq_ignore_ascii_case(skip) {
                    return Ok(PromptOutcome::Skipped);
                }
            }

            match validate(reply.to_string()).await {
                Ok(value) => return Ok(PromptOutcome::Value(value)),
                Err(err) if err.kind().is_recoverable() => {
                    tracing::debug!(
                        attempt,
                        err_code = err.code(),
                        "reply rejected, asking again"
                    );
                    let notice = if err.message().is_empty() {
                        "That didn't match anything. Please try again."
                    } else {
                        err.message()
                    };
                    self.session.send(notice).await?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ScriptedSession;

    const T: Duration = Duration::from_secs(1);

    fn not_found(msg: &str) -> ExError {
        ExError::new(ExErrorKind::NotFound).with_message(msg)
    }

    #[tokio::test]
    async fn test_value_on_first_valid_reply() {
        let session = ScriptedSession::new(["  hello  "]);
        let outcome = PromptLoop::new(&session, T)
            .ask("name?", |reply| async move { Ok(reply) })
            .await
            .unwrap();
        assert_eq!(outcome, PromptOutcome::Value("hello".to_string()));
    }

    #[tokio::test]
    async fn test_not_found_reasks_and_relays_message() {
        let session = ScriptedSession::new(["nope", "yes"]);
        let outcome = PromptLoop::new(&session, T)
            .ask("q", |reply| async move {
                if reply == "yes" {
                    Ok(1)
                } else {
                    Err(not_found("No match for `nope`."))
                }
            })
            .await
            .unwrap();
        assert_eq!(outcome, PromptOutcome::Value(1));
        assert_eq!(session.prompts().len(), 2);
        assert_eq!(session.sent(), vec!["No match for `nope`."]);
    }

    #[tokio::test]
    async fn test_cancel_token_is_case_insensitive_and_skips_validation() {
        let session = ScriptedSession::new([" C "]);
        let err = PromptLoop::new(&session, T)
            .ask("q", |_reply| async move {
                Err::<(), _>(ExError::new(ExErrorKind::Internal))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_skip_only_with_skip_token() {
        let session = ScriptedSession::new(["s"]);
        let outcome = PromptLoop::new(&session, T)
            .with_skip_token(SKIP_TOKEN)
            .ask("q", |reply| async move { Ok(reply) })
            .await
            .unwrap();
        assert_eq!(outcome, PromptOutcome::Skipped);

        let session = ScriptedSession::new(["s"]);
        let outcome = PromptLoop::new(&session, T)
            .ask("q", |reply| async move { Ok(reply) })
            .await
            .unwrap();
        assert_eq!(outcome, PromptOutcome::Value("s".to_string()));
    }

    #[tokio::test]
    async fn test_timeout_ends_loop_without_retry() {
        let session = ScriptedSession::new(["bad"]).then_silence();
        let err = PromptLoop::new(&session, T)
            .ask("q", |_reply| async move { Err::<(), _>(not_found("again")) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::TimedOut);
        assert_eq!(session.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_reply_is_not_validated() {
        let session = ScriptedSession::new(["   ", "x"]);
        let mut calls = 0;
        let outcome = PromptLoop::new(&session, T)
            .ask("q", |reply| {
                calls += 1;
                async move { Ok(reply) }
            })
            .await
            .unwrap();
        assert_eq!(outcome, PromptOutcome::Value("x".to_string()));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_non_recoverable_validator_error_propagates() {
        let session = ScriptedSession::new(["x"]);
        let err = PromptLoop::new(&session, T)
            .ask("q", |_reply| async move {
                Err::<(), _>(ExError::new(ExErrorKind::PermissionDenied))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PermissionDenied);
        assert!(session.sent().is_empty());
    }
}
