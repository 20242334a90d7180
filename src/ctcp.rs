//! CTCP (Client-To-Client Protocol) sub-grammar lifted out of PRIVMSG/NOTICE
//! trailing parameters, including the DCC SEND subcommand.

const DELIM: char = '\u{0001}';

/// Which CTCP command a message carries. `Other` preserves anything not in
/// this closed, well-known set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CtcpKind {
    Action,
    Version,
    Ping,
    Time,
    ClientInfo,
    Source,
    Finger,
    DccSend,
    Other(String),
}

impl CtcpKind {
    fn from_command(cmd: &str) -> Self {
        match cmd.to_ascii_uppercase().as_str() {
            "ACTION" => CtcpKind::Action,
            "VERSION" => CtcpKind::Version,
            "PING" => CtcpKind::Ping,
            "TIME" => CtcpKind::Time,
            "CLIENTINFO" => CtcpKind::ClientInfo,
            "SOURCE" => CtcpKind::Source,
            "FINGER" => CtcpKind::Finger,
            "DCC" => CtcpKind::DccSend,
            other => CtcpKind::Other(other.to_owned()),
        }
    }

    pub fn command_name(&self) -> &str {
        match self {
            CtcpKind::Action => "ACTION",
            CtcpKind::Version => "VERSION",
            CtcpKind::Ping => "PING",
            CtcpKind::Time => "TIME",
            CtcpKind::ClientInfo => "CLIENTINFO",
            CtcpKind::Source => "SOURCE",
            CtcpKind::Finger => "FINGER",
            CtcpKind::DccSend => "DCC",
            CtcpKind::Other(s) => s,
        }
    }
}

/// Borrowed view of a CTCP payload: `COMMAND params`. A missing
/// trailing delimiter is tolerated (§6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    pub kind: CtcpKind,
    pub params: Option<&'a str>,
}

/// Owned counterpart, for when the source text doesn't outlive the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtcpOwned {
    pub kind: CtcpKind,
    pub params: Option<String>,
}

impl<'a> Ctcp<'a> {
    /// If `trailing` (a PRIVMSG/NOTICE trailing parameter) is CTCP-wrapped,
    /// split out the command word and the rest of the payload.
    pub fn parse(trailing: &'a str) -> Option<Ctcp<'a>> {
        let inner = strip_delims(trailing)?;
        let (cmd, rest) = match inner.split_once(' ') {
            Some((cmd, rest)) => (cmd, Some(rest)),
            None => (inner, None),
        };
        if cmd.is_empty() {
            return None;
        }
        Some(Ctcp {
            kind: CtcpKind::from_command(cmd),
            params: rest,
        })
    }

    pub fn to_owned_ctcp(&self) -> CtcpOwned {
        CtcpOwned {
            kind: self.kind.clone(),
            params: self.params.map(str::to_owned),
        }
    }
}

/// Strip the leading `` (required) and trailing `` (optional,
/// per §6: "absence of a trailing sentinel is tolerated").
fn strip_delims(s: &str) -> Option<&str> {
    let s = s.strip_prefix(DELIM)?;
    Some(s.strip_suffix(DELIM).unwrap_or(s))
}

/// Wrap a CTCP command + params into a PRIVMSG/NOTICE trailing payload.
pub fn wrap(command: &str, params: Option<&str>) -> String {
    let mut s = String::new();
    s.push(DELIM);
    s.push_str(command);
    if let Some(p) = params {
        s.push(' ');
        s.push_str(p);
    }
    s.push(DELIM);
    s
}

/// A parsed `DCC SEND` announcement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DccSend {
    pub filename: String,
    pub host: String,
    pub port: u16,
    pub filesize: u64,
}

/// Parse `SEND "my file.txt" 3232235777 12345 4096` (the params half of a
/// `DCC` CTCP, after the `DCC` command word itself has been split off).
/// Uses a quote-aware tokenizer so filenames containing spaces survive.
pub fn parse_dcc_send(params: &str) -> Option<DccSend> {
    let params = params.strip_prefix("SEND ").or_else(|| params.strip_prefix("send "))?;
    let tokens = tokenize_quote_aware(params);
    if tokens.len() != 4 {
        return None;
    }
    Some(DccSend {
        filename: tokens[0].clone(),
        host: tokens[1].clone(),
        port: tokens[2].parse().ok()?,
        filesize: tokens[3].parse().ok()?,
    })
}

/// Split on whitespace, except inside a pair of unescaped double quotes,
/// which group their contents (spaces included) into a single token.
fn tokenize_quote_aware(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_content = false;

    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_content = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_content {
                    tokens.push(std::mem::take(&mut current));
                    has_content = false;
                }
            }
            c => {
                current.push(c);
                has_content = true;
            }
        }
    }
    if has_content {
        tokens.push(current);
    }
    tokens
}
