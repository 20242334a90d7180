//! Zero-copy encoding for [`Message`] and [`Prefix`].

use std::io::{self, Write};

use crate::message::Message;
use crate::message::tags::escape_tag_value;
use crate::prefix::Prefix;

use super::IrcEncode;

impl IrcEncode for Prefix {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let mut written = w.write(self.name.as_bytes())?;
        if let Some(user) = &self.user {
            written += w.write(b"!")?;
            written += w.write(user.as_bytes())?;
        }
        if let Some(host) = &self.host {
            written += w.write(b"@")?;
            written += w.write(host.as_bytes())?;
        }
        Ok(written)
    }
}

impl IrcEncode for Message {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        if self.kind.is_sentinel() {
            let mut written = w.write(self.raw_line.as_bytes())?;
            written += w.write(b"\r\n")?;
            return Ok(written);
        }

        let command = self
            .kind
            .as_command()
            .expect("non-sentinel MessageKind always carries a Command");

        let mut written = 0;

        if let Some(tags) = &self.tags {
            if !tags.is_empty() {
                let mut buf = String::new();
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        buf.push(';');
                    }
                    buf.push_str(&tag.key);
                    if let Some(value) = &tag.value {
                        buf.push('=');
                        let _ = escape_tag_value(&mut buf, value);
                    }
                }
                written += w.write(b"@")?;
                written += w.write(buf.as_bytes())?;
                written += w.write(b" ")?;
            }
        }

        if let Some(prefix) = &self.prefix {
            written += w.write(b":")?;
            written += prefix.encode(w)?;
            written += w.write(b" ")?;
        }

        written += command.encode(w)?;
        written += w.write(b"\r\n")?;
        Ok(written)
    }
}
