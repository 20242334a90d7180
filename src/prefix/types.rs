//! Source (`:nick!user@host`) of an IRC message.

/// True if `s` looks like a syntactically valid prefix body (the part after
/// the leading `:`, before the first space).
///
/// A prefix is either a server name (no `!`/`@`) or `nick[!user][@host]`.
/// This only rejects the obviously malformed shapes (empty name, `@`/`!`
/// appearing with nothing before them); it does not validate nickname or
/// hostname grammar — that's [`crate::validation`]'s job once the engine
/// knows whether the prefix names a user or a server.
pub fn is_valid_prefix_str(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let (name, rest) = match s.find(['!', '@']) {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    };
    if name.is_empty() {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    if let Some(at_rel) = rest.find('@') {
        let user = &rest[1..at_rel];
        let host = &rest[at_rel + 1..];
        !user.is_empty() && !host.is_empty() && rest.starts_with('!')
    } else {
        // `name@host` with no user
        let host = &rest[1..];
        !host.is_empty()
    }
}

/// Borrowed, zero-copy view of a parsed prefix.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PrefixRef<'a> {
    /// The exact text that followed the leading `:`.
    pub raw: &'a str,
    /// Nickname, or server name when `user`/`host` are both `None`.
    pub name: &'a str,
    pub user: Option<&'a str>,
    pub host: Option<&'a str>,
}

impl<'a> PrefixRef<'a> {
    /// Split `raw` (the text following the leading `:`) into its
    /// name/user/host components. Infallible: anything that doesn't match
    /// `nick!user@host`/`nick@host` is treated as a bare server/nick name.
    pub fn parse(raw: &'a str) -> PrefixRef<'a> {
        match raw.find('!') {
            Some(bang) => {
                let name = &raw[..bang];
                let rest = &raw[bang + 1..];
                match rest.find('@') {
                    Some(at) => PrefixRef {
                        raw,
                        name,
                        user: Some(&rest[..at]),
                        host: Some(&rest[at + 1..]),
                    },
                    None => PrefixRef {
                        raw,
                        name,
                        user: Some(rest),
                        host: None,
                    },
                }
            }
            None => match raw.find('@') {
                Some(at) => PrefixRef {
                    raw,
                    name: &raw[..at],
                    user: None,
                    host: Some(&raw[at + 1..]),
                },
                None => PrefixRef {
                    raw,
                    name: raw,
                    user: None,
                    host: None,
                },
            },
        }
    }

    pub fn to_owned_prefix(&self) -> Prefix {
        Prefix {
            name: self.name.to_owned(),
            user: self.user.map(str::to_owned),
            host: self.host.map(str::to_owned),
        }
    }

    /// True if this prefix names a server rather than a client (no user,
    /// no host — servers never carry either).
    pub fn is_server(&self) -> bool {
        self.user.is_none() && self.host.is_none()
    }
}

/// Owned source of a message: either a server name, or a full
/// `nick!user@host` client mask (user/host present only as negotiated or
/// observed).
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Prefix {
    pub name: String,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl Prefix {
    pub fn new(name: impl Into<String>) -> Self {
        Prefix {
            name: name.into(),
            user: None,
            host: None,
        }
    }

    pub fn new_from_str(s: &str) -> Self {
        PrefixRef::parse(s).to_owned_prefix()
    }

    pub fn with_user_host(
        name: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Prefix {
            name: name.into(),
            user: Some(user.into()),
            host: Some(host.into()),
        }
    }

    pub fn as_ref(&self) -> PrefixRef<'_> {
        PrefixRef {
            raw: &self.name,
            name: &self.name,
            user: self.user.as_deref(),
            host: self.host.as_deref(),
        }
    }

    pub fn is_server(&self) -> bool {
        self.user.is_none() && self.host.is_none()
    }
}
