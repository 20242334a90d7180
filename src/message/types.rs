//! The owned [`Message`] envelope: every parsed (or failed-to-parse) line.

use std::fmt;

use crate::command::Command;
use crate::prefix::Prefix;

/// One `key[=value]` entry from a message's tag section.
///
/// Values are stored already unescaped. A `Vec<Tag>` (not a `HashMap`)
/// preserves the insertion order the grammar and the round-trip law both
/// require; duplicate keys are resolved last-wins at parse time, so by the
/// time a `Tag` vector reaches application code each key appears once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: Option<String>,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Tag {
            key: key.into(),
            value: value.map(Into::into),
        }
    }

    /// Insert-or-replace `key` in `tags`, preserving the position of an
    /// existing entry (last-wins, first-position-wins for ordering).
    pub fn set(tags: &mut Vec<Tag>, key: &str, value: Option<String>) {
        if let Some(existing) = tags.iter_mut().find(|t| t.key == key) {
            existing.value = value;
        } else {
            tags.push(Tag {
                key: key.to_owned(),
                value,
            });
        }
    }
}

/// Why a line failed to become a fully typed [`Command`].
///
/// These are the four sentinel variants from the data model: `Unsupported`
/// (unknown command, or grammar failure before a command could even be
/// read), `ParseError` (recognized command, extraction failed), `TooLong`
/// (length cap exceeded), `NotEnoughParameters` (recognized command, too few
/// parameters for its minimum arity). They are message *content*, not
/// exceptions — `Message::parse` is infallible and always returns one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// Successfully parsed into a known command variant.
    Command(Command),
    /// Unknown command, or a grammar failure before dispatch.
    Unsupported { reason: String },
    /// Known command, but parameter extraction/conversion failed.
    ParseError { reason: String },
    /// The line exceeded the tag or body length cap.
    TooLong { len: usize },
    /// Known command, fewer parameters than its minimum arity.
    NotEnoughParameters,
}

impl MessageKind {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, MessageKind::Command(_))
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            MessageKind::Command(c) => Some(c),
            _ => None,
        }
    }
}

/// A fully parsed (or failed-to-parse) IRC line.
///
/// Carries the common envelope — `raw_line`, `tags`, `prefix`, the textual
/// `command` — plus `kind`, which is either the typed [`Command`] payload or
/// one of the four sentinel variants in [`MessageKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Exact input line, CR/LF stripped. Sentinel variants marshal back to
    /// this verbatim.
    pub raw_line: String,
    /// Tag section, in insertion order, last-wins on duplicate keys. `None`
    /// if the line had no `@...` section at all (distinct from an empty one,
    /// which is a grammar failure).
    pub tags: Option<Vec<Tag>>,
    pub prefix: Option<Prefix>,
    /// Upper-cased command token or 3-digit numeric, as read from the line.
    pub command: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(command: impl Into<String>, kind: MessageKind) -> Self {
        let command = command.into();
        Message {
            raw_line: String::new(),
            tags: None,
            prefix: None,
            command,
            kind,
        }
    }

    pub fn from_command(command: Command) -> Self {
        Message::new(command.name(), MessageKind::Command(command))
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        let tags = self.tags.get_or_insert_with(Vec::new);
        Tag::set(tags, &key.into(), value.map(Into::into));
        self
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn tag(&self, key: &str) -> Option<Option<&str>> {
        self.tags
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_deref())
    }

    pub fn command(&self) -> Option<&Command> {
        self.kind.as_command()
    }

    pub fn prefix_name(&self) -> Option<&str> {
        self.prefix.as_ref().map(|p| p.name.as_str())
    }

    pub fn prefix_user(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(|p| p.user.as_deref())
    }

    pub fn prefix_host(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(|p| p.host.as_deref())
    }

    // Builders for commonly constructed outgoing messages.

    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_command(Command::PRIVMSG(target.into(), text.into()))
    }

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_command(Command::NOTICE(target.into(), text.into()))
    }

    pub fn join(channels: impl Into<String>) -> Self {
        Message::from_command(Command::JOIN(channels.into(), None, None))
    }

    pub fn part(channels: impl Into<String>, reason: Option<impl Into<String>>) -> Self {
        Message::from_command(Command::PART(channels.into(), reason.map(Into::into)))
    }

    pub fn ping(token: impl Into<String>) -> Self {
        Message::from_command(Command::PING(token.into(), None))
    }

    pub fn pong(token: impl Into<String>) -> Self {
        Message::from_command(Command::PONG(token.into(), None))
    }

    pub fn nick(nickname: impl Into<String>) -> Self {
        Message::from_command(Command::NICK(nickname.into()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::serialize::marshal(self))
    }
}

impl std::str::FromStr for Message {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(super::parse::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_set_replaces_in_place() {
        let mut tags = vec![Tag::new("a", Some("1")), Tag::new("b", Some("2"))];
        Tag::set(&mut tags, "a", Some("9".to_owned()));
        assert_eq!(tags[0].value.as_deref(), Some("9"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn builders_round_trip_through_display() {
        let msg = Message::privmsg("#rust", "hi");
        assert_eq!(msg.to_string(), "PRIVMSG #rust :hi");
    }
}
