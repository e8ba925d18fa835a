//! Command types and definitions.

use std::fmt;

/// Result of a successful command match: the matched alias plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    name: String,
    args: Vec<String>,
}

impl CommandRecord {
    /// Creates a record for `name` with the given argument tokens.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The alias as declared in the alias group, not as typed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument tokens, in input order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Flattens into `[name, args...]`.
impl From<CommandRecord> for Vec<String> {
    fn from(record: CommandRecord) -> Self {
        let mut tokens = Vec::with_capacity(record.args.len() + 1);
        tokens.push(record.name);
        tokens.extend(record.args);
        tokens
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg:?}")?;
        }
        Ok(())
    }
}

/// An inbound message as seen by the command filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Message text, absent for media-only messages.
    pub text: Option<String>,

    /// Sender id, absent for anonymous or channel posts.
    pub sender_id: Option<i64>,

    /// Set by the filter when the message matched a command.
    pub command: Option<CommandRecord>,
}

impl IncomingMessage {
    /// Creates a text message from a known sender.
    #[must_use]
    pub fn new(text: impl Into<String>, sender_id: i64) -> Self {
        Self {
            text: Some(text.into()),
            sender_id: Some(sender_id),
            command: None,
        }
    }
}

/// Why the filter did or did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The message carries no text.
    NoText,

    /// The message has no identifiable sender.
    NoSender,

    /// The text is empty after trimming.
    EmptyText,

    /// The text starts with none of the account's prefixes.
    NoPrefixMatch,

    /// A prefix matched but no alias followed it.
    NoAliasMatch,

    /// The message invokes the command.
    Matched(CommandRecord),
}

impl FilterOutcome {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Consumes the outcome, returning the record on a match.
    #[must_use]
    pub fn into_record(self) -> Option<CommandRecord> {
        match self {
            Self::Matched(record) => Some(record),
            _ => None,
        }
    }
}

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command was successful.
    pub success: bool,

    /// Response message to show the user.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_flattens_name_first() {
        let record = CommandRecord::new("ping", vec!["a".to_owned(), "b c".to_owned()]);
        assert_eq!(record.arg(1), Some("b c"));
        assert_eq!(record.arg(2), None);
        assert_eq!(Vec::<String>::from(record), ["ping", "a", "b c"]);
    }

    #[test]
    fn test_record_display_quotes_args() {
        let record = CommandRecord::new("say", vec!["hello world".to_owned()]);
        assert_eq!(record.to_string(), r#"say "hello world""#);
    }

    #[test]
    fn test_outcome_into_record() {
        let record = CommandRecord::new("p", vec![]);
        assert!(FilterOutcome::Matched(record.clone()).is_match());
        assert_eq!(FilterOutcome::Matched(record.clone()).into_record(), Some(record));
        assert_eq!(FilterOutcome::NoAliasMatch.into_record(), None);
    }
}
