//! Prefix and alias matching for inbound messages.
//!
//! A message invokes a command when, after trimming, it starts with one of
//! the receiving account's prefixes followed by one of the command's aliases
//! (case-insensitive), optionally mentioning the account as `alias@username`,
//! and then whitespace or the end of the text. The rest is split into
//! arguments by [`tokenize`].

use tracing::debug;

use super::tokenizer::tokenize;
use super::types::{CommandRecord, FilterOutcome, IncomingMessage};
use crate::account::{AccountProfile, AccountRegistry, PrefixSet};

/// Matcher for one alias group such as `"ping|p"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFilter {
    aliases: Vec<String>,
}

impl CommandFilter {
    /// Builds a filter from a `|`-delimited alias group.
    ///
    /// Aliases keep their declared order and spelling; empty ones are dropped.
    #[must_use]
    pub fn new(alias_group: &str) -> Self {
        let aliases = alias_group
            .split('|')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned)
            .collect();

        Self { aliases }
    }

    /// Returns the aliases in match order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Decides whether `message` invokes this command.
    ///
    /// Pure with respect to its inputs. `username` may be empty, in which
    /// case only the bare alias form is accepted.
    #[must_use]
    pub fn evaluate(
        &self,
        message: &IncomingMessage,
        username: &str,
        prefixes: &PrefixSet,
    ) -> FilterOutcome {
        let Some(text) = message.text.as_deref() else {
            return FilterOutcome::NoText;
        };

        if message.sender_id.is_none() {
            return FilterOutcome::NoSender;
        }

        let text = text.trim();
        if text.is_empty() {
            return FilterOutcome::EmptyText;
        }

        let mut any_prefix = false;

        for remainder in prefixes.strip_all(text) {
            any_prefix = true;

            for alias in &self.aliases {
                if let Some(args) = match_alias(remainder, alias, username) {
                    let record = CommandRecord::new(alias.as_str(), tokenize(args));
                    return FilterOutcome::Matched(record);
                }
            }
        }

        if any_prefix {
            FilterOutcome::NoAliasMatch
        } else {
            FilterOutcome::NoPrefixMatch
        }
    }

    /// Evaluates `message` for `account` and attaches the record on a match.
    ///
    /// Prefixes are looked up for `account` only, never for another session.
    pub async fn check(
        &self,
        registry: &AccountRegistry,
        account: &AccountProfile,
        message: &mut IncomingMessage,
    ) -> bool {
        let prefixes = registry.prefixes(account.id).await;
        self.apply(message, account.username_or_empty(), &prefixes)
    }

    /// Synchronous form of [`check`](Self::check) for callers that already
    /// hold the prefix set.
    pub fn apply(
        &self,
        message: &mut IncomingMessage,
        username: &str,
        prefixes: &PrefixSet,
    ) -> bool {
        match self.evaluate(message, username, prefixes) {
            FilterOutcome::Matched(record) => {
                debug!("Matched command: {}", record);
                message.command = Some(record);
                true
            }
            outcome => {
                debug!("No match for {:?}: {:?}", self.aliases, outcome);
                false
            }
        }
    }
}

/// Matches `alias`, an optional `@username` mention and a word boundary at
/// the start of `remainder`. Returns the text after the match.
fn match_alias<'a>(remainder: &'a str, alias: &str, username: &str) -> Option<&'a str> {
    let after_alias = strip_prefix_ignore_case(remainder, alias)?;

    if !username.is_empty()
        && let Some(after_mention) = after_alias
            .strip_prefix('@')
            .and_then(|rest| strip_prefix_ignore_case(rest, username))
        && at_boundary(after_mention)
    {
        return Some(after_mention);
    }

    at_boundary(after_alias).then_some(after_alias)
}

/// Strips `literal` from the start of `text`, comparing case-insensitively.
fn strip_prefix_ignore_case<'a>(text: &'a str, literal: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();

    for expected in literal.chars() {
        let (_, actual) = chars.next()?;
        if !eq_ignore_case(expected, actual) {
            return None;
        }
    }

    let consumed = chars.next().map_or(text.len(), |(i, _)| i);
    Some(&text[consumed..])
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn at_boundary(text: &str) -> bool {
    text.chars().next().is_none_or(char::is_whitespace)
}
