//! Server-side guarded state (§4.5 "State" / §3 "Server state"): per-connection
//! registration/capability bookkeeping, the nickname index, and channel
//! membership tables.

use std::collections::{HashMap, HashSet};

use crate::isupport::ParameterStore;

/// Surrogate key for a connection. [`crate::transport::Connection`] is a
/// trait object and can't be hashed directly, so the engine assigns each
/// accepted connection a small opaque id and keys every table on that
/// instead of the connection handle itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Per-connection registration and capability state (§3 "Server state").
#[derive(Clone, Debug, Default)]
pub struct ConnectionState {
    pub nickname: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
    pub password_ok: bool,
    pub cap_negotiating: bool,
    pub registered: bool,
    pub last_ping: u64,
    pub last_pong: u64,
    pub active_caps: HashSet<String>,
    pub is_operator: bool,
    pub away_message: Option<String>,
}

impl ConnectionState {
    /// §3 invariant: registered iff nickname/username/realname are all set,
    /// any required PASS has been accepted, and CAP negotiation isn't live.
    pub fn is_complete(&self, password_required: bool) -> bool {
        self.nickname.is_some()
            && self.username.is_some()
            && self.realname.is_some()
            && (!password_required || self.password_ok)
            && !self.cap_negotiating
    }
}

/// A membership record: the set of mode chars a member holds in one channel.
pub type Membership = HashSet<char>;

/// A channel as tracked by the server (§3 `ServerChannel`).
#[derive(Clone, Debug, Default)]
pub struct ServerChannel {
    pub members: HashSet<ConnectionId>,
    pub memberships: HashMap<ConnectionId, Membership>,
    pub topic: Option<String>,
    pub topic_set_by: Option<String>,
    pub topic_set_at: Option<u64>,
    /// Type A (list) mode values, e.g. `'b' -> {"*!*@host", ...}`.
    pub list_values: HashMap<char, HashSet<String>>,
    /// Type B/C scalar settings, e.g. `'k' -> "key"`, `'l' -> "40"`.
    pub settings: HashMap<char, String>,
    /// Type D flags currently set.
    pub flags: HashSet<char>,
}

impl ServerChannel {
    pub fn new() -> Self {
        ServerChannel::default()
    }

    /// `@` if +s (secret), `*` if +p (private), `=` otherwise (§4.5 NAMES
    /// status symbol).
    pub fn status_symbol(&self) -> char {
        if self.flags.contains(&'s') {
            '@'
        } else if self.flags.contains(&'p') {
            '*'
        } else {
            '='
        }
    }
}

/// All mutable state the Server Engine owns, bound by a
/// [`crate::guard::StateGuard`]. Connection handles themselves
/// (`Box<dyn Connection>`) live outside this struct since they aren't
/// `Clone`; this struct holds only the `Clone`-able bookkeeping the
/// transactional JOIN/PART handlers snapshot.
#[derive(Clone, Debug, Default)]
pub struct ServerState {
    pub parameters: ParameterStore,
    pub connections: HashMap<ConnectionId, ConnectionState>,
    /// Case-folded nickname -> connection.
    pub nickname_index: HashMap<String, ConnectionId>,
    pub channels: HashMap<String, ServerChannel>,
}

impl ServerState {
    pub fn fold(&self, s: &str) -> String {
        self.parameters.fold(s)
    }

    pub fn watchers_of_channel(&self, name: &str) -> HashSet<ConnectionId> {
        self.channels
            .get(name)
            .map(|c| c.members.clone())
            .unwrap_or_default()
    }

    /// Every connection sharing at least one channel with `id` (§GLOSSARY
    /// "Watchers"), used for NICK/QUIT fan-out.
    pub fn watchers_of_connection(&self, id: ConnectionId) -> HashSet<ConnectionId> {
        let mut out = HashSet::new();
        for channel in self.channels.values() {
            if channel.members.contains(&id) {
                out.extend(channel.members.iter().copied());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_complete_requires_all_fields() {
        let mut conn = ConnectionState::default();
        assert!(!conn.is_complete(false));
        conn.nickname = Some("alice".into());
        conn.username = Some("alice".into());
        conn.realname = Some("Alice".into());
        assert!(conn.is_complete(false));
        assert!(!conn.is_complete(true));
        conn.password_ok = true;
        assert!(conn.is_complete(true));
    }

    #[test]
    fn status_symbol_reflects_flags() {
        let mut chan = ServerChannel::new();
        assert_eq!(chan.status_symbol(), '=');
        chan.flags.insert('p');
        assert_eq!(chan.status_symbol(), '*');
        chan.flags.insert('s');
        assert_eq!(chan.status_symbol(), '@');
    }
}
