//! Free-text resolution of directory objects
//!
//! Turns an operator's reply into exactly one object from a candidate list.
//! Explicit ids and mentions win outright; otherwise names are matched
//! case-insensitively by substring, and several matches always lead to an
//! interactive choice. The first match is never picked silently.

use std::time::Duration;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::NamedObject;
use crate::session::Session;
use crate::settings::BotSettings;

/// Parse a platform-native id or mention token (`123`, `<@&123>`, `<#123>`)
pub fn parse_explicit_id(query: &str) -> Option<u64> {
    let query = query.trim();
    let inner = match query.strip_prefix('<') {
        Some(rest) => rest.strip_suffix('>')?.trim_start_matches(['@', '&', '#', '!']),
        None => query,
    };
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

/// Candidates whose name contains `query`, ignoring case and one leading
/// `#` or `@`. Candidate order is preserved.
pub fn match_by_name<'c, T: NamedObject>(query: &str, candidates: &'c [T]) -> Vec<&'c T> {
    let query = query.trim();
    let query = query
        .strip_prefix('#')
        .or_else(|| query.strip_prefix('@'))
        .unwrap_or(query)
        .to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    candidates
        .iter()
        .filter(|c| c.name().to_lowercase().contains(&query))
        .collect()
}

pub struct EntityResolver<'a> {
    session: &'a dyn Session,
    selection_timeout: Duration,
    max_choices: usize,
}

impl<'a> EntityResolver<'a> {
    pub fn new(session: &'a dyn Session, settings: &BotSettings) -> Self {
        Self {
            session,
            selection_timeout: settings.selection_timeout(),
            max_choices: settings.max_choices.max(1),
        }
    }

    /// Resolve `query` to one of `candidates`.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matches; `Cancelled` or `TimedOut` from the
    /// disambiguation menu.
    pub async fn resolve<T>(&self, query: &str, candidates: &[T]) -> Result<T>
    where
        T: NamedObject + Clone + Send + Sync,
    {
        if let Some(id) = parse_explicit_id(query) {
            let by_id: Vec<&T> = candidates
                .iter()
                .filter(|c| c.raw_id() == Some(id))
                .collect();
            if let [only] = by_id.as_slice() {
                return Ok((*only).clone());
            }
        }

        let matches = match_by_name(query, candidates);
        match matches.len() {
            0 => Err(ExError::new(ExErrorKind::NotFound)
                .with_op("resolve")
                .with_entity(query.trim())
                .with_message(format!(
                    "No {}s matching `{}` were found.",
                    T::KIND,
                    query.trim()
                ))),
            1 => Ok(matches[0].clone()),
            _ => {
                let owned: Vec<T> = matches.into_iter().cloned().collect();
                self.select(query.trim(), owned).await
            }
        }
    }

    /// Ask the operator to pick one of `matches`.
    ///
    /// A single match is returned without asking. Lists longer than the
    /// configured maximum are truncated.
    ///
    /// # Errors
    ///
    /// `NotFound` for an empty list; `Cancelled` or `TimedOut` from the menu.
    pub async fn select<T>(&self, subject: &str, mut matches: Vec<T>) -> Result<T>
    where
        T: NamedObject + Send + Sync,
    {
        match matches.len() {
            0 => {
                return Err(ExError::new(ExErrorKind::NotFound)
                    .with_op("select")
                    .with_entity(subject)
                    .with_message(format!("No {}s to choose from.", T::KIND)))
            }
            1 => return Ok(matches.remove(0)),
            _ => {}
        }

        let labels: Vec<String> = matches
            .iter()
            .map(|m| format!("{} ({})", m.name(), m.mention()))
            .collect();
        tracing::debug!(
            err_code = ExErrorKind::Ambiguous.code(),
            candidates = labels.len(),
            "several {}s match, asking operator",
            T::KIND
        );

        let total = matches.len();
        let mut title = if subject.is_empty() {
            format!("Please choose a {}:", T::KIND)
        } else {
            format!("Multiple {}s match `{}`. Please choose one:", T::KIND, subject)
        };
        if total > self.max_choices {
            matches.truncate(self.max_choices);
            title.push_str(&format!(
                "\n(Showing the first {} of {} matches; refine your query to see the rest.)",
                self.max_choices, total
            ));
        }
        let shown = &labels[..matches.len()];

        let index = self
            .session
            .disambiguate(&title, shown, self.selection_timeout)
            .await?;
        if index >= matches.len() {
            return Err(ExError::new(ExErrorKind::Internal)
                .with_op("select")
                .with_message(format!("selection index {} out of range", index)));
        }
        Ok(matches.swap_remove(index))
    }
}
