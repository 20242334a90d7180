//! Marshal a [`Message`] back into a raw line.

use std::fmt::Write as _;

use super::tags::escape_tag_value;
use super::types::{Message, MessageKind};

/// Inverse of [`super::parse::parse`].
///
/// Sentinel variants marshal back to `raw_line` verbatim (§4.1's round-trip
/// law explicitly excludes them); everything else is rebuilt from `tags` +
/// `prefix` + the typed [`crate::command::Command`], via its existing
/// `String: From<&Command>` marshaller.
pub fn marshal(msg: &Message) -> String {
    if msg.kind.is_sentinel() {
        return msg.raw_line.clone();
    }

    let command = msg
        .kind
        .as_command()
        .expect("non-sentinel MessageKind always carries a Command");

    let mut out = String::new();

    if let Some(tags) = &msg.tags {
        if !tags.is_empty() {
            out.push('@');
            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push_str(&tag.key);
                if let Some(value) = &tag.value {
                    out.push('=');
                    let _ = escape_tag_value(&mut out, value);
                }
            }
            out.push(' ');
        }
    }

    if let Some(prefix) = &msg.prefix {
        out.push(':');
        let _ = write!(out, "{}", prefix);
        out.push(' ');
    }

    out.push_str(&String::from(command));
    out
}

#[cfg(test)]
mod tests {
    use crate::command::Command;
    use crate::message::types::{Message, MessageKind};
    use crate::prefix::Prefix;

    #[test]
    fn marshals_tags_prefix_and_command() {
        let msg = Message::from_command(Command::PRIVMSG("#c".to_owned(), "hi".to_owned()))
            .with_tag("time", Some("2023-01-01T00:00:00Z"))
            .with_prefix(Prefix::with_user_host("nick", "user", "host"));
        assert_eq!(
            msg.to_string(),
            "@time=2023-01-01T00:00:00Z :nick!user@host PRIVMSG #c :hi"
        );
    }

    #[test]
    fn sentinel_marshals_to_raw_line_verbatim() {
        let msg = Message {
            raw_line: "BOGUS foo bar".to_owned(),
            tags: None,
            prefix: None,
            command: "BOGUS".to_owned(),
            kind: MessageKind::Unsupported {
                reason: "unknown command".to_owned(),
            },
        };
        assert_eq!(msg.to_string(), "BOGUS foo bar");
    }
}
