//! RPL_ISUPPORT (005): a read-only borrowed parser over one 005 line's
//! tokens, plus [`ParameterStore`], the mutable, accumulating record an
//! engine applies every 005 line's tokens into over the life of a
//! connection.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>, 
}

impl<'a> Isupport<'a> {
    pub fn parse_params(params: &[&'a str]) -> Self {
        let mut entries = Vec::with_capacity(params.len());
        for &p in params {
            if p.starts_with(':') { break; }
            if p.is_empty() { continue; }
            let (k, v) = if let Some(eq) = p.find('=') {
                (&p[..eq], Some(&p[eq + 1..]))
            } else {
                (p, None)
            };

            entries.push(IsupportEntry { key: k, value: v });
        }
        Isupport { entries }
    }

    pub fn from_response_args(args: &[&'a str]) -> Option<Self> {
        if args.is_empty() {
            return None;
        }
        
        let mut tokens = &args[1..];
        
        if let Some(last) = tokens.last() {
            if last.contains(' ') { tokens = &tokens[..tokens.len().saturating_sub(1)]; }
        }
        Some(Self::parse_params(tokens))
    }

    pub fn from_message(msg: &'a crate::Message) -> Option<Self> {
        match &msg.command {
            crate::command::Command::Response(crate::response::Response::RPL_ISUPPORT, ref a) => {
                let borrowed: Vec<&'a str> = a.iter().map(|s| s.as_str()).collect();
                Self::from_response_args(&borrowed)
            }
            _ => None,
        }
    }

    pub fn from_message_ref(msg: &'a crate::MessageRef<'a>) -> Option<Self> {
        if let Ok(resp) = msg.command.name.parse::<crate::response::Response>() {
            if resp == crate::response::Response::RPL_ISUPPORT {
                let borrowed: Vec<&'a str> = msg.command.args.to_vec();
                return Self::from_response_args(&borrowed);
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }



    pub fn casemapping(&self) -> Option<&'a str> { self.get("CASEMAPPING").flatten() }

    pub fn chantypes(&self) -> Option<&'a str> { self.get("CHANTYPES").flatten() }

    pub fn network(&self) -> Option<&'a str> { self.get("NETWORK").flatten() }

    pub fn prefix(&self) -> Option<PrefixSpec<'a>> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }

    pub fn chanmodes(&self) -> Option<ChanModes<'a>> {
        self.get("CHANMODES").flatten().and_then(ChanModes::parse)
    }

    pub fn has_excepts(&self) -> bool { self.get("EXCEPTS").is_some() }

    pub fn excepts_mode(&self) -> Option<char> {
        self.get("EXCEPTS").flatten().and_then(|s| s.chars().next())
    }

    pub fn has_invex(&self) -> bool { self.get("INVEX").is_some() }

    pub fn invex_mode(&self) -> Option<char> {
        self.get("INVEX").flatten().and_then(|s| s.chars().next())
    }

    pub fn targmax(&self) -> Option<TargMax<'a>> {
        self.get("TARGMAX").flatten().and_then(TargMax::parse)
    }

    pub fn maxlist(&self) -> Option<MaxList> {
        self.get("MAXLIST").flatten().and_then(MaxList::parse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {

        if let Some(open) = s.find('(') {
            if let Some(close) = s[open + 1..].find(')') {
                let close = open + 1 + close;
                let modes = &s[open + 1..close];
                let prefixes = &s[close + 1..];
                if !modes.is_empty() && !prefixes.is_empty() { return Some(PrefixSpec { modes, prefixes }); }
            }
        } else if !s.is_empty() {
            return Some(PrefixSpec { modes: "", prefixes: s });
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    pub a: &'a str,
    pub b: &'a str,
    pub c: &'a str,
    pub d: &'a str,
}

impl<'a> ChanModes<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut parts = s.splitn(4, ',');
        let (a,b,c,d) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        Some(ChanModes { a, b, c, d })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargMax<'a> {
    entries: Vec<(&'a str, Option<usize>)>,
}

impl<'a> TargMax<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        if s.is_empty() { return Some(TargMax { entries: Vec::new() }); }
        let mut entries = Vec::new();
        for part in s.split(',') {
            if part.is_empty() { continue; }
            if let Some(colon) = part.find(':') {
                let (cmd, num) = (&part[..colon], &part[colon+1..]);
                let val = num.parse::<usize>().ok();
                if !cmd.is_empty() { entries.push((cmd, val)); }
            } else {
                
                entries.push((part, None));
            }
        }
        Some(TargMax { entries })
    }

    pub fn get(&self, cmd: &str) -> Option<Option<usize>> {
        self.entries.iter().find(|(k, _)| k.eq_ignore_ascii_case(cmd)).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Option<usize>)> + '_ {
        self.entries.iter().copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaxList {
    entries: Vec<(char, usize)>,
}

impl MaxList {
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() { return Some(MaxList { entries: Vec::new() }); }
        let mut entries: Vec<(char, usize)> = Vec::new();
        for part in s.split(',') {
            if part.is_empty() { continue; }
            let (modes, limit_str) = part.split_once(':')?;


            let limit: usize = match limit_str.parse() { Ok(n) => n, Err(_) => continue };
            for ch in modes.chars() {
                
                entries.retain(|(c, _)| *c != ch);
                entries.push((ch, limit));
            }
        }
        Some(MaxList { entries })
    }

    pub fn limit_for(&self, mode: char) -> Option<usize> {
        self.entries.iter().rev().find(|(c, _)| *c == mode).map(|(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.entries.iter().copied()
    }
}







#[derive(Debug, Clone, Default)]
pub struct IsupportBuilder {
    tokens: Vec<String>,
}

impl IsupportBuilder {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn network(mut self, name: &str) -> Self {
        self.tokens.push(format!("NETWORK={}", name));
        self
    }

    pub fn chantypes(mut self, types: &str) -> Self {
        self.tokens.push(format!("CHANTYPES={}", types));
        self
    }

    pub fn chanmodes(mut self, modes: &str) -> Self {
        self.tokens.push(format!("CHANMODES={}", modes));
        self
    }

    pub fn prefix(mut self, symbols: &str, letters: &str) -> Self {
        self.tokens.push(format!("PREFIX=({}){}",letters, symbols));
        self
    }

    pub fn casemapping(mut self, mapping: &str) -> Self {
        self.tokens.push(format!("CASEMAPPING={}", mapping));
        self
    }

    pub fn max_channels(mut self, count: u32) -> Self {
        self.tokens.push(format!("MAXCHANNELS={}", count));
        self
    }

    pub fn max_nick_length(mut self, len: u32) -> Self {
        self.tokens.push(format!("NICKLEN={}", len));
        self
    }

    pub fn max_topic_length(mut self, len: u32) -> Self {
        self.tokens.push(format!("TOPICLEN={}", len));
        self
    }


    pub fn modes_count(mut self, count: u32) -> Self {
        self.tokens.push(format!("MODES={}", count));
        self
    }

    pub fn status_msg(mut self, symbols: &str) -> Self {
        self.tokens.push(format!("STATUSMSG={}", symbols));
        self
    }

    pub fn excepts(mut self, mode_char: Option<char>) -> Self {
        if let Some(c) = mode_char {
            self.tokens.push(format!("EXCEPTS={}", c));
        } else {
            self.tokens.push("EXCEPTS".to_string());
        }
        self
    }

    pub fn invex(mut self, mode_char: Option<char>) -> Self {
        if let Some(c) = mode_char {
            self.tokens.push(format!("INVEX={}", c));
        } else {
            self.tokens.push("INVEX".to_string());
        }
        self
    }
    pub fn custom(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.tokens.push(format!("{}={}", key, v));
        } else {
            self.tokens.push(key.to_string());
        }
        self
    }

    pub fn build(self) -> String {
        self.tokens.join(" ")
    }

    pub fn build_lines(self, max_per_line: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = Vec::new();

        for token in self.tokens {
            current.push(token);
            if current.len() >= max_per_line {
                lines.push(current.join(" "));
                current.clear();
            }
        }

        if !current.is_empty() {
            lines.push(current.join(" "));
        }

        lines
    }
}

/// `IntMax` from §3: "no cap". Represented as `None` throughout
/// `ParameterStore` rather than a sentinel integer.
pub type Cap = Option<usize>;

/// RFC1459 is the historical default; switching away from it is set-once
/// (§3 invariant, §9 rationale: avoids unstable identity folding mid-session).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseMapping {
    Rfc1459,
    Ascii,
    Rfc7613,
}

impl Default for CaseMapping {
    fn default() -> Self {
        CaseMapping::Rfc1459
    }
}

impl CaseMapping {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rfc1459" => Some(CaseMapping::Rfc1459),
            "ascii" => Some(CaseMapping::Ascii),
            "rfc7613" | "precis" => Some(CaseMapping::Rfc7613),
            _ => None,
        }
    }
}

/// The mutable, typed view of negotiated `RPL_ISUPPORT` state (§3/§4.2).
///
/// Built incrementally: each `005` line's tokens are fed to [`apply`],
/// one call per token. Unknown tokens are logged and ignored; malformed
/// values for a known token fall back to that token's documented default
/// rather than erroring, matching §4.2's "never an error" posture.
#[derive(Clone, Debug)]
pub struct ParameterStore {
    pub away_len: Cap,
    case_mapping: CaseMapping,
    case_mapping_set: bool,
    pub channel_limits: HashMap<char, Cap>,
    pub type_a_channel_modes: std::collections::HashSet<char>,
    pub type_b_channel_modes: std::collections::HashSet<char>,
    pub type_c_channel_modes: std::collections::HashSet<char>,
    pub type_d_channel_modes: std::collections::HashSet<char>,
    pub channel_len: Cap,
    pub channel_types: std::collections::HashSet<char>,
    pub excepts: Option<char>,
    pub extended_ban_prefix: Option<char>,
    pub extended_ban_modes: std::collections::HashSet<char>,
    pub host_len: Cap,
    pub invite_exceptions: Option<char>,
    pub kick_len: Cap,
    pub max_list: HashMap<char, Cap>,
    pub max_targets: Cap,
    pub modes: Cap,
    pub network: String,
    pub nick_len: Cap,
    /// Ordered mode-char -> symbol-char, e.g. `[('o', '@'), ('v', '+')]`.
    pub prefixes: Vec<(char, char)>,
    pub safe_list: bool,
    pub silence: Cap,
    pub status_message: std::collections::HashSet<char>,
    pub target_max: HashMap<String, Cap>,
    pub topic_len: Cap,
    pub user_len: Cap,
}

impl Default for ParameterStore {
    fn default() -> Self {
        ParameterStore {
            away_len: None,
            case_mapping: CaseMapping::default(),
            case_mapping_set: false,
            channel_limits: HashMap::new(),
            type_a_channel_modes: Default::default(),
            type_b_channel_modes: Default::default(),
            type_c_channel_modes: Default::default(),
            type_d_channel_modes: Default::default(),
            channel_len: None,
            channel_types: ['#', '&'].into_iter().collect(),
            excepts: None,
            extended_ban_prefix: None,
            extended_ban_modes: Default::default(),
            host_len: None,
            invite_exceptions: None,
            kick_len: None,
            max_list: HashMap::new(),
            max_targets: None,
            modes: None,
            network: String::new(),
            nick_len: None,
            prefixes: Vec::new(),
            safe_list: false,
            silence: None,
            status_message: Default::default(),
            target_max: HashMap::new(),
            topic_len: None,
            user_len: None,
        }
    }
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_mapping(&self) -> CaseMapping {
        self.case_mapping
    }

    /// Case-fold `s` under the negotiated `CASEMAPPING` (§4.2). `Ascii`
    /// folds only `A-Z`; `Rfc1459`/`Rfc7613` additionally fold
    /// `{}|^` per the historical Scandinavian mapping.
    pub fn fold(&self, s: &str) -> String {
        match self.case_mapping {
            CaseMapping::Ascii => s.to_ascii_lowercase(),
            CaseMapping::Rfc1459 | CaseMapping::Rfc7613 => crate::casemap::irc_to_lower(s),
        }
    }

    /// Apply one `TOKEN[=value]` entry from a `005` line. `value` is `None`
    /// both for bare flag tokens (`SAFELIST`) and for `-TOKEN` disables;
    /// `disable` distinguishes the two.
    pub fn apply(&mut self, token: &str, value: Option<&str>) {
        let (token, disable) = match token.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (token, false),
        };
        let token = token.to_ascii_uppercase();

        match token.as_str() {
            "AWAYLEN" => self.away_len = self.apply_int(value, disable, "AWAYLEN"),
            "CHANNELLEN" => self.channel_len = self.apply_int(value, disable, "CHANNELLEN"),
            "HOSTLEN" => self.host_len = self.apply_int(value, disable, "HOSTLEN"),
            "KICKLEN" => self.kick_len = self.apply_int(value, disable, "KICKLEN"),
            "MAXTARGETS" => self.max_targets = self.apply_int(value, disable, "MAXTARGETS"),
            "MODES" => self.modes = self.apply_int(value, disable, "MODES"),
            "NICKLEN" => self.nick_len = self.apply_int(value, disable, "NICKLEN"),
            "TOPICLEN" => self.topic_len = self.apply_int(value, disable, "TOPICLEN"),
            "USERLEN" => self.user_len = self.apply_int(value, disable, "USERLEN"),

            "CASEMAPPING" => {
                if disable {
                    self.case_mapping = CaseMapping::Rfc1459;
                    self.case_mapping_set = false;
                } else if !self.case_mapping_set {
                    match value.and_then(CaseMapping::parse) {
                        Some(cm) => {
                            self.case_mapping = cm;
                            self.case_mapping_set = true;
                        }
                        None => tracing::warn!(?value, "unrecognized CASEMAPPING value"),
                    }
                } else {
                    tracing::warn!(?value, "CASEMAPPING is set-once, ignoring change");
                }
            }

            "CHANLIMIT" => {
                if disable {
                    self.channel_limits.clear();
                } else if let Some(v) = value {
                    Self::apply_char_limit_list(v, &mut self.channel_limits);
                }
            }
            "MAXLIST" => {
                if disable {
                    self.max_list.clear();
                } else if let Some(v) = value {
                    Self::apply_char_limit_list(v, &mut self.max_list);
                }
            }

            "CHANMODES" => {
                if disable {
                    self.type_a_channel_modes.clear();
                    self.type_b_channel_modes.clear();
                    self.type_c_channel_modes.clear();
                    self.type_d_channel_modes.clear();
                } else if let Some(cm) = value.and_then(ChanModes::parse) {
                    self.type_a_channel_modes = cm.a.chars().collect();
                    self.type_b_channel_modes = cm.b.chars().collect();
                    self.type_c_channel_modes = cm.c.chars().collect();
                    self.type_d_channel_modes = cm.d.chars().collect();
                } else {
                    tracing::warn!(?value, "malformed CHANMODES");
                }
            }

            "CHANTYPES" => {
                if disable {
                    self.channel_types = ['#', '&'].into_iter().collect();
                } else if let Some(v) = value {
                    self.channel_types = v.chars().collect();
                }
            }

            "EXCEPTS" => {
                self.excepts = if disable {
                    None
                } else {
                    Some(value.and_then(|v| v.chars().next()).unwrap_or('e'))
                };
            }
            "INVEX" => {
                self.invite_exceptions = if disable {
                    None
                } else {
                    Some(value.and_then(|v| v.chars().next()).unwrap_or('I'))
                };
            }

            "EXTBAN" => {
                if disable {
                    self.extended_ban_prefix = None;
                    self.extended_ban_modes.clear();
                } else if let Some(v) = value {
                    let mut parts = v.splitn(2, ',');
                    let prefix = parts.next().unwrap_or("");
                    let modes = parts.next().unwrap_or("");
                    self.extended_ban_prefix = prefix.chars().next();
                    self.extended_ban_modes = modes.chars().collect();
                }
            }

            "NETWORK" => {
                self.network = if disable {
                    String::new()
                } else {
                    value.unwrap_or_default().to_owned()
                };
            }

            "PREFIX" => {
                if disable {
                    self.prefixes.clear();
                } else {
                    self.prefixes = value
                        .and_then(PrefixSpec::parse)
                        .filter(|spec| spec.modes.chars().count() == spec.prefixes.chars().count())
                        .map(|spec| spec.modes.chars().zip(spec.prefixes.chars()).collect())
                        .unwrap_or_default();
                    if value.is_some() && self.prefixes.is_empty() {
                        tracing::warn!(?value, "malformed PREFIX, disabling nickname prefixes");
                    }
                }
            }

            "SAFELIST" => self.safe_list = !disable,

            "SILENCE" => {
                self.silence = if disable {
                    None
                } else {
                    match value.filter(|v| !v.is_empty()) {
                        None => None,
                        Some(v) => match v.parse::<usize>() {
                            Ok(n) => Some(n),
                            Err(_) => {
                                tracing::warn!(value = v, "non-numeric SILENCE value");
                                None
                            }
                        },
                    }
                };
            }

            "STATUSMSG" => {
                self.status_message = if disable {
                    Default::default()
                } else {
                    value.map(|v| v.chars().collect()).unwrap_or_default()
                };
            }

            "TARGMAX" => {
                if disable {
                    self.target_max.clear();
                } else if let Some(v) = value {
                    self.target_max.clear();
                    if let Some(tm) = TargMax::parse(v) {
                        for (cmd, n) in tm.iter() {
                            self.target_max.insert(cmd.to_ascii_uppercase(), n);
                        }
                    }
                }
            }

            _ => {
                tracing::warn!(token = %token, "unrecognized ISUPPORT token, ignoring");
            }
        }
    }

    fn apply_int(&self, value: Option<&str>, disable: bool, token: &str) -> Cap {
        if disable {
            return None;
        }
        match value {
            None => None,
            Some(v) => match v.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!(token, value = v, "non-numeric ISUPPORT value, using IntMax");
                    None
                }
            },
        }
    }

    fn apply_char_limit_list(value: &str, into: &mut HashMap<char, Cap>) {
        for part in value.split(',') {
            if part.is_empty() {
                continue;
            }
            let (chars, n) = match part.split_once(':') {
                Some((c, n)) => (c, n.parse::<usize>().ok()),
                None => (part, None),
            };
            for c in chars.chars() {
                into.insert(c, n);
            }
        }
    }
}

#[cfg(test)]
mod parameter_store_tests {
    use super::*;

    #[test]
    fn integer_token_applies_and_disables() {
        let mut store = ParameterStore::new();
        store.apply("NICKLEN", Some("30"));
        assert_eq!(store.nick_len, Some(30));
        store.apply("-NICKLEN", None);
        assert_eq!(store.nick_len, None);
    }

    #[test]
    fn casemapping_is_set_once() {
        let mut store = ParameterStore::new();
        store.apply("CASEMAPPING", Some("ascii"));
        assert_eq!(store.case_mapping(), CaseMapping::Ascii);
        store.apply("CASEMAPPING", Some("rfc1459"));
        assert_eq!(store.case_mapping(), CaseMapping::Ascii);
    }

    #[test]
    fn prefix_builds_ordered_mode_symbol_map() {
        let mut store = ParameterStore::new();
        store.apply("PREFIX", Some("(ov)@+"));
        assert_eq!(store.prefixes, vec![('o', '@'), ('v', '+')]);
    }

    #[test]
    fn malformed_prefix_disables_prefixes() {
        let mut store = ParameterStore::new();
        store.apply("PREFIX", Some("(ov)@"));
        assert!(store.prefixes.is_empty());
    }

    #[test]
    fn chanmodes_splits_into_four_groups() {
        let mut store = ParameterStore::new();
        store.apply("CHANMODES", Some("eIb,k,l,imnpst"));
        assert!(store.type_a_channel_modes.contains(&'b'));
        assert!(store.type_b_channel_modes.contains(&'k'));
        assert!(store.type_c_channel_modes.contains(&'l'));
        assert!(store.type_d_channel_modes.contains(&'m'));
    }

    #[test]
    fn unknown_token_is_ignored_not_error() {
        let mut store = ParameterStore::new();
        store.apply("SOMETHING_NEW", Some("whatever"));
        // No panic, no field mutated; nothing to assert beyond "didn't crash".
    }

    #[test]
    fn targmax_tracks_per_command_caps() {
        let mut store = ParameterStore::new();
        store.apply("TARGMAX", Some("PRIVMSG:4,NOTICE:3,JOIN:"));
        assert_eq!(store.target_max.get("PRIVMSG"), Some(&Some(4)));
        assert_eq!(store.target_max.get("JOIN"), Some(&None));
    }
}
