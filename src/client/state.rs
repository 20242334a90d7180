//! Client-side guarded state (§4.4 "State"): `me`, the negotiated parameter
//! store, the capability registry, and the user/channel tables the UI reads.

use std::collections::{HashMap, HashSet};

use crate::caps::CapabilityRegistry;
use crate::isupport::ParameterStore;
use crate::prefix::Prefix;

/// A user this client currently knows about, either itself or a peer seen
/// in a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientUser {
    pub nickname: String,
    pub away: bool,
    pub operator: bool,
    /// Last time this user was observed (message, NAMES, WHO reply), used
    /// by the 5-minute GC sweep to drop stale non-member entries.
    pub last_touched_ms: u64,
}

impl ClientUser {
    pub fn new(nickname: impl Into<String>, now_ms: u64) -> Self {
        ClientUser {
            nickname: nickname.into(),
            away: false,
            operator: false,
            last_touched_ms: now_ms,
        }
    }
}

/// A channel this client is a member of, or has cached membership for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientChannel {
    pub name: String,
    /// Case-folded nick -> mode chars currently held on this channel
    /// (derived from RPL_NAMREPLY symbols or live MODE changes).
    pub members: HashMap<String, HashSet<char>>,
    /// Type A (list) mode values, e.g. `'b' -> {"*!*@host", ...}`.
    pub list_values: HashMap<char, HashSet<String>>,
    pub topic: Option<String>,
    pub topic_set_by: Option<String>,
    pub topic_set_at: Option<u64>,
}

impl ClientChannel {
    pub fn new(name: impl Into<String>) -> Self {
        ClientChannel {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// All mutable state a Client Engine worker owns, bound by a
/// [`crate::guard::StateGuard`].
#[derive(Clone, Debug, Default)]
pub struct ClientState {
    pub me: Option<Prefix>,
    pub parameters: ParameterStore,
    pub capabilities: CapabilityRegistry,
    /// Case-folded nick -> user.
    pub users: HashMap<String, ClientUser>,
    /// Case-folded channel name -> channel.
    pub channels: HashMap<String, ClientChannel>,
}

impl ClientState {
    pub fn fold(&self, s: &str) -> String {
        self.parameters.fold(s)
    }

    /// Drop users with no live channel membership whose last observation
    /// predates `now_ms - idle_ms` (§4.4 "periodic task").
    pub fn gc(&mut self, now_ms: u64, idle_ms: u64) -> usize {
        let member_of: HashSet<&String> = self
            .channels
            .values()
            .flat_map(|c| c.members.keys())
            .collect();
        let threshold = now_ms.saturating_sub(idle_ms);
        let before = self.users.len();
        self.users.retain(|nick, user| {
            member_of.contains(nick) || user.last_touched_ms >= threshold
        });
        before - self.users.len()
    }
}
