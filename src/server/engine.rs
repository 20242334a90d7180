//! The Server Engine (§4.5): connection acceptance, CAP negotiation,
//! registration, channel maintenance, message routing, and the PING
//! watchdog for a single-threaded server worker.

use std::collections::HashMap;

use crate::chan::is_channel_name_with;
use crate::command::{CapSubCommand, Command};
use crate::config::ServerConfig;
use crate::error::EngineError;
use crate::guard::StateGuard;
use crate::isupport::ParameterStore;
use crate::message::{Message, MessageKind, Tag};
use crate::mode::{apply_mode_string, ChannelMode, DynamicModeTarget, Mode};
use crate::prefix::Prefix;
use crate::response::Response;
use crate::transport::Connection;

use super::state::{ConnectionId, ConnectionState, ServerChannel, ServerState};

/// Capabilities this server knows how to negotiate (§1 Non-goals: nothing
/// beyond message-tags/server-time/echo-message/away-notify/cap-notify).
const SUPPORTED_CAPS: &[&str] = &[
    "message-tags",
    "server-time",
    "echo-message",
    "away-notify",
    "cap-notify",
];

/// Lifecycle of the server worker itself (§4.5 "State").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerEngineState {
    Active,
    Closed,
}

/// The single-threaded server engine: owns every connection's bookkeeping
/// state plus the connection handles themselves (§4.5, §6).
pub struct ServerEngine {
    engine_state: ServerEngineState,
    config: ServerConfig,
    state: StateGuard<ServerState>,
    /// Connection handles, kept outside the guarded state since
    /// `Box<dyn Connection>` is neither `Clone` nor usable inside a
    /// [`StateGuard::transaction`] snapshot (§4.6).
    connections: HashMap<ConnectionId, Box<dyn Connection>>,
    next_id: u64,
}

impl ServerEngine {
    pub fn new(config: ServerConfig) -> Self {
        let mut parameters = ParameterStore::new();
        for (token, value) in &config.isupport_seed {
            parameters.apply(token, value.as_deref());
        }
        let state = ServerState {
            parameters,
            ..Default::default()
        };
        ServerEngine {
            engine_state: ServerEngineState::Active,
            config,
            state: StateGuard::new(state),
            connections: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &ServerState {
        self.state.get()
    }

    pub fn engine_state(&self) -> ServerEngineState {
        self.engine_state
    }

    /// Register a newly accepted connection (§4.5 "Connection acceptance"),
    /// returning the id every later call keys on. `now_ms` seeds the
    /// watchdog's ping/pong clock.
    pub fn accept(&mut self, conn: Box<dyn Connection>, now_ms: u64) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        let cstate = ConnectionState {
            last_ping: now_ms,
            last_pong: now_ms,
            ..Default::default()
        };
        self.state.get_mut().connections.insert(id, cstate);
        self.connections.insert(id, conn);
        id
    }

    fn send(&self, id: ConnectionId, msg: &Message) {
        if let Some(conn) = self.connections.get(&id) {
            conn.offer(msg.to_string());
        }
    }

    fn nick_of(&self, id: ConnectionId) -> String {
        self.state
            .get()
            .connections
            .get(&id)
            .and_then(|c| c.nickname.clone())
            .unwrap_or_else(|| "*".to_owned())
    }

    fn prefix_of(&self, id: ConnectionId) -> Prefix {
        Prefix::new(self.nick_of(id))
    }

    fn send_numeric(&self, id: ConnectionId, resp: Response, mut params: Vec<String>) {
        let mut full = vec![self.nick_of(id)];
        full.append(&mut params);
        let msg = Message::from_command(Command::Response(resp, full))
            .with_prefix(Prefix::new(self.config.server_name.clone()));
        self.send(id, &msg);
    }

    /// Tear down a connection and purge it from every table (§4.5
    /// "Disconnection"). Returns the channels the connection was a member
    /// of, so the caller can broadcast QUIT/fan-out before this was called.
    fn close_connection(&mut self, id: ConnectionId) {
        self.connections.remove(&id);
        let st = self.state.get_mut();
        st.connections.remove(&id);
        st.nickname_index.retain(|_, v| *v != id);
        let mut emptied = Vec::new();
        for (name, chan) in st.channels.iter_mut() {
            chan.members.remove(&id);
            chan.memberships.remove(&id);
            if chan.members.is_empty() {
                emptied.push(name.clone());
            }
        }
        for name in emptied {
            st.channels.remove(&name);
        }
    }

    /// Feed one raw ingress line through the engine (§5 "Ingress"). Parsing
    /// is infallible; malformed input comes back as a `MessageKind`
    /// sentinel rather than an `Err`.
    pub fn handle_line(&mut self, id: ConnectionId, line: &str, now_ms: u64) {
        let msg: Message = line.parse().unwrap();
        self.handle_message(id, &msg, now_ms);
    }

    pub fn handle_message(&mut self, id: ConnectionId, msg: &Message, now_ms: u64) {
        match &msg.kind {
            MessageKind::TooLong { .. } => {
                self.send_numeric(
                    id,
                    Response::ERR_INPUTTOOLONG,
                    vec!["input line too long".to_owned()],
                );
            }
            MessageKind::NotEnoughParameters => {
                self.send_numeric(
                    id,
                    Response::ERR_NEEDMOREPARAMS,
                    vec![msg.command.clone(), "not enough parameters".to_owned()],
                );
            }
            MessageKind::Unsupported { .. } | MessageKind::ParseError { .. } => {}
            MessageKind::Command(command) => {
                self.dispatch(id, command, msg.tags.as_deref(), now_ms)
            }
        }
    }

    fn dispatch(&mut self, id: ConnectionId, command: &Command, tags: Option<&[Tag]>, now_ms: u64) {
        match command {
            Command::CAP(_, subcmd, code, _) => {
                self.handle_cap(id, *subcmd, code.as_deref().unwrap_or(""));
            }
            Command::PASS(password) => self.handle_pass(id, password),
            Command::NICK(nickname) => self.handle_nick(id, nickname),
            Command::USER(username, _, realname) => self.handle_user(id, username, realname),
            Command::OPER(name, password) => self.handle_oper(id, name, password),
            Command::JOIN(channels, keys, _) => self.handle_join(id, channels, keys.as_deref()),
            Command::PART(channels, reason) => self.handle_part(id, channels, reason.as_deref()),
            Command::ChannelMODE(target, modes) => self.handle_channel_mode(id, target, modes),
            Command::TOPIC(channel, topic) => self.handle_topic(id, channel, topic.as_deref()),
            Command::KICK(channel, nickname, reason) => {
                self.handle_kick(id, channel, nickname, reason.as_deref())
            }
            Command::PRIVMSG(target, text) => self.route_text(id, target, text, tags, false),
            Command::NOTICE(target, text) => self.route_text(id, target, text, tags, true),
            Command::AWAY(message) => self.handle_away(id, message.clone()),
            Command::PING(token, _) => self.handle_ping(id, token),
            Command::PONG(token, _) => self.handle_pong(id, token, now_ms),
            Command::KILL(nickname, reason) => self.handle_kill(id, nickname, reason),
            Command::QUIT(reason) => self.handle_quit(id, reason.clone()),
            _ => {}
        }
    }

    // ---- CAP negotiation (§4.5) --------------------------------------

    fn handle_cap(&mut self, id: ConnectionId, subcmd: CapSubCommand, text: &str) {
        let nick = self.nick_of(id);
        match subcmd {
            CapSubCommand::LS => {
                if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
                    if !conn.registered {
                        conn.cap_negotiating = true;
                    }
                }
                let caps = SUPPORTED_CAPS.join(" ");
                let msg = Message::from_command(Command::CAP(
                    Some(nick),
                    CapSubCommand::LS,
                    None,
                    Some(caps),
                ))
                .with_prefix(Prefix::new(self.config.server_name.clone()));
                self.send(id, &msg);
            }
            CapSubCommand::LIST => {
                let active = self
                    .state
                    .get()
                    .connections
                    .get(&id)
                    .map(|c| c.active_caps.iter().cloned().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                let msg = Message::from_command(Command::CAP(
                    Some(nick),
                    CapSubCommand::LIST,
                    None,
                    Some(active),
                ))
                .with_prefix(Prefix::new(self.config.server_name.clone()));
                self.send(id, &msg);
            }
            CapSubCommand::REQ => {
                let (known, unknown): (Vec<&str>, Vec<&str>) = text
                    .split_whitespace()
                    .partition(|c| SUPPORTED_CAPS.contains(c));
                if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
                    for cap in &known {
                        conn.active_caps.insert((*cap).to_owned());
                    }
                }
                if !known.is_empty() {
                    let msg = Message::from_command(Command::CAP(
                        Some(nick.clone()),
                        CapSubCommand::ACK,
                        None,
                        Some(known.join(" ")),
                    ))
                    .with_prefix(Prefix::new(self.config.server_name.clone()));
                    self.send(id, &msg);
                }
                if !unknown.is_empty() {
                    let msg = Message::from_command(Command::CAP(
                        Some(nick),
                        CapSubCommand::NAK,
                        None,
                        Some(unknown.join(" ")),
                    ))
                    .with_prefix(Prefix::new(self.config.server_name.clone()));
                    self.send(id, &msg);
                }
            }
            CapSubCommand::END => {
                let complete = {
                    let conn = self.state.get_mut().connections.get_mut(&id);
                    if let Some(conn) = conn {
                        conn.cap_negotiating = false;
                        conn.is_complete(self.config.password.is_some())
                    } else {
                        false
                    }
                };
                if complete {
                    self.send_welcome(id);
                }
            }
            CapSubCommand::NEW | CapSubCommand::DEL | CapSubCommand::ACK | CapSubCommand::NAK => {}
        }
    }

    // ---- Registration (§3, §4.5) --------------------------------------

    fn handle_pass(&mut self, id: ConnectionId, password: &str) {
        let required = self.config.password.clone();
        let mismatch = match &required {
            Some(expected) => password != expected,
            None => false,
        };
        if mismatch {
            self.send_numeric(
                id,
                EngineError::PasswordMismatch.numeric(),
                vec!["Password incorrect".to_owned()],
            );
            if let Some(conn) = self.connections.get(&id) {
                conn.close_deferred();
            }
            return;
        }
        if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
            conn.password_ok = true;
        }
    }

    fn handle_nick(&mut self, id: ConnectionId, nickname: &str) {
        let invalid = nickname.is_empty()
            || nickname.contains(' ')
            || is_channel_name_with(nickname, &self.state.get().parameters.channel_types.iter().copied().collect::<Vec<_>>());
        if invalid {
            self.send_numeric(
                id,
                EngineError::ErroneousNickname(nickname.to_owned()).numeric(),
                vec![nickname.to_owned(), "Erroneous nickname".to_owned()],
            );
            return;
        }
        let key = self.state.get().fold(nickname);
        let clash = self
            .state
            .get()
            .nickname_index
            .get(&key)
            .is_some_and(|owner| *owner != id);
        if clash {
            self.send_numeric(
                id,
                EngineError::NicknameInUse(nickname.to_owned()).numeric(),
                vec![nickname.to_owned(), "Nickname is already in use".to_owned()],
            );
            return;
        }

        let old_nick = self
            .state
            .get()
            .connections
            .get(&id)
            .and_then(|c| c.nickname.clone());
        let watchers = self.state.get().watchers_of_connection(id);

        let st = self.state.get_mut();
        if let Some(old) = &old_nick {
            let old_key = st.fold(old);
            st.nickname_index.remove(&old_key);
        }
        st.nickname_index.insert(key, id);
        if let Some(conn) = st.connections.get_mut(&id) {
            conn.nickname = Some(nickname.to_owned());
        }

        if let Some(old) = old_nick {
            let announce = Message::from_command(Command::NICK(nickname.to_owned()))
                .with_prefix(Prefix::new(old));
            for watcher in &watchers {
                self.send(*watcher, &announce);
            }
            self.send(id, &announce);
        }

        let complete = self
            .state
            .get()
            .connections
            .get(&id)
            .is_some_and(|c| c.is_complete(self.config.password.is_some()));
        if complete {
            self.send_welcome(id);
        }
    }

    fn handle_user(&mut self, id: ConnectionId, username: &str, realname: &str) {
        let already = self
            .state
            .get()
            .connections
            .get(&id)
            .is_some_and(|c| c.registered);
        if already {
            self.send_numeric(
                id,
                EngineError::AlreadyRegistered.numeric(),
                vec!["Unauthorized command (already registered)".to_owned()],
            );
            return;
        }
        let complete = {
            let conn = self.state.get_mut().connections.get_mut(&id);
            match conn {
                Some(conn) => {
                    conn.username = Some(username.to_owned());
                    conn.realname = Some(realname.to_owned());
                    conn.is_complete(self.config.password.is_some())
                }
                None => false,
            }
        };
        if complete {
            self.send_welcome(id);
        }
    }

    fn handle_oper(&mut self, id: ConnectionId, name: &str, password: &str) {
        let ok = self
            .config
            .operator_credentials
            .iter()
            .any(|(n, p)| n == name && p == password);
        if ok {
            if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
                conn.is_operator = true;
            }
            self.send_numeric(
                id,
                Response::RPL_YOUREOPER,
                vec!["You are now an IRC operator".to_owned()],
            );
        } else {
            self.send_numeric(
                id,
                Response::ERR_PASSWDMISMATCH,
                vec!["Password incorrect".to_owned()],
            );
        }
    }

    fn handle_kill(&mut self, id: ConnectionId, nickname: &str, reason: &str) {
        let is_operator = self
            .state
            .get()
            .connections
            .get(&id)
            .is_some_and(|c| c.is_operator);
        if !is_operator {
            self.send_numeric(
                id,
                Response::ERR_NOPRIVILEGES,
                vec!["Permission Denied- You're not an IRC operator".to_owned()],
            );
            return;
        }
        let key = self.state.get().fold(nickname);
        let Some(target) = self.state.get().nickname_index.get(&key).copied() else {
            self.send_numeric(
                id,
                Response::ERR_NOSUCHNICK,
                vec![nickname.to_owned(), "No such nick".to_owned()],
            );
            return;
        };
        let watchers = self.state.get().watchers_of_connection(target);
        let killer = self.nick_of(id);
        let quit = Message::from_command(Command::QUIT(Some(format!(
            "Killed ({} ({}))",
            killer, reason
        ))))
        .with_prefix(self.prefix_of(target));
        for watcher in &watchers {
            if *watcher != target {
                self.send(*watcher, &quit);
            }
        }
        self.send(target, &quit);
        if let Some(conn) = self.connections.get(&target) {
            conn.close_deferred();
        }
        self.close_connection(target);
    }

    fn send_welcome(&mut self, id: ConnectionId) {
        let nick = self.nick_of(id);
        if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
            conn.registered = true;
        }
        self.send_numeric(
            id,
            Response::RPL_WELCOME,
            vec![format!(
                "{}, Welcome to the {} Network, {}",
                self.config.welcome_greeting, self.config.network_name, nick
            )],
        );
        self.send_numeric(
            id,
            Response::RPL_YOURHOST,
            vec![format!(
                "Your host is {}, running version ircforge",
                self.config.server_name
            )],
        );
        self.send_numeric(
            id,
            Response::RPL_CREATED,
            vec!["This server was created just now".to_owned()],
        );
        self.send_numeric(
            id,
            Response::RPL_MYINFO,
            vec![
                self.config.server_name.clone(),
                "ircforge".to_owned(),
                "io".to_owned(),
                "ntlk".to_owned(),
            ],
        );
        self.send_isupport(id);
    }

    /// Chunks `005` tokens at [`ServerConfig::ISUPPORT_CHUNK_SIZE`] per line
    /// (§4.5), sourced straight from the seeded ISUPPORT tokens.
    fn send_isupport(&self, id: ConnectionId) {
        let tokens: Vec<String> = self
            .config
            .isupport_seed
            .iter()
            .map(|(k, v)| match v {
                Some(v) => format!("{}={}", k, v),
                None => k.clone(),
            })
            .collect();
        if tokens.is_empty() {
            return;
        }
        for chunk in tokens.chunks(ServerConfig::ISUPPORT_CHUNK_SIZE) {
            let mut params: Vec<String> = chunk.to_vec();
            params.push("are supported by this server".to_owned());
            self.send_numeric(id, Response::RPL_ISUPPORT, params);
        }
    }

    // ---- Channels (§4.5, transactional per §4.6) -----------------------

    fn handle_join(&mut self, id: ConnectionId, channels: &str, _keys: Option<&str>) {
        for channel in channels.split(',') {
            let channel = channel.trim();
            if channel.is_empty() {
                continue;
            }
            let key = self.state.get().fold(channel);
            let result: Result<(), ()> = self.state.transaction(|st| {
                let chan = st.channels.entry(key.clone()).or_insert_with(ServerChannel::new);
                chan.members.insert(id);
                chan.memberships.entry(id).or_default();
                Ok(())
            });
            if result.is_err() {
                continue;
            }

            let prefix = self.prefix_of(id);
            let join = Message::from_command(Command::JOIN(channel.to_owned(), None, None))
                .with_prefix(prefix);
            let watchers = self.state.get().watchers_of_channel(&key);
            for watcher in &watchers {
                self.send(*watcher, &join);
            }

            let (topic, topic_set_by, topic_set_at) = {
                let st = self.state.get();
                let chan = st.channels.get(&key);
                (
                    chan.and_then(|c| c.topic.clone()),
                    chan.and_then(|c| c.topic_set_by.clone()),
                    chan.and_then(|c| c.topic_set_at),
                )
            };
            match &topic {
                Some(text) => {
                    self.send_numeric(id, Response::RPL_TOPIC, vec![channel.to_owned(), text.clone()]);
                    if let (Some(who), Some(at)) = (topic_set_by, topic_set_at) {
                        self.send_numeric(
                            id,
                            Response::RPL_TOPICWHOTIME,
                            vec![channel.to_owned(), who, at.to_string()],
                        );
                    }
                }
                None => {
                    self.send_numeric(
                        id,
                        Response::RPL_NOTOPIC,
                        vec![channel.to_owned(), "No topic is set".to_owned()],
                    );
                }
            }

            self.send_names(id, channel, &key);
        }
    }

    fn send_names(&self, id: ConnectionId, channel_name: &str, key: &str) {
        let st = self.state.get();
        let nick_len = st.parameters.nick_len.unwrap_or(9).max(1);
        let chunk_size = self.config.names_chunk_size(nick_len);
        let Some(chan) = st.channels.get(key) else {
            return;
        };
        let symbol = chan.status_symbol();
        let mut names: Vec<String> = chan
            .members
            .iter()
            .map(|m| {
                let nick = st
                    .connections
                    .get(m)
                    .and_then(|c| c.nickname.clone())
                    .unwrap_or_default();
                let prefixed = chan
                    .memberships
                    .get(m)
                    .and_then(|modes| {
                        st.parameters
                            .prefixes
                            .iter()
                            .find(|(mode, _)| modes.contains(mode))
                            .map(|(_, sym)| *sym)
                    })
                    .map(|sym| format!("{}{}", sym, nick))
                    .unwrap_or(nick);
                prefixed
            })
            .collect();
        names.sort();
        for chunk in names.chunks(chunk_size) {
            self.send_numeric(
                id,
                Response::RPL_NAMREPLY,
                vec![symbol.to_string(), channel_name.to_owned(), chunk.join(" ")],
            );
        }
        self.send_numeric(
            id,
            Response::RPL_ENDOFNAMES,
            vec![channel_name.to_owned(), "End of /NAMES list".to_owned()],
        );
    }

    fn handle_part(&mut self, id: ConnectionId, channels: &str, reason: Option<&str>) {
        for channel in channels.split(',') {
            let channel = channel.trim();
            let key = self.state.get().fold(channel);
            if !self.state.get().channels.contains_key(&key) {
                self.send_numeric(
                    id,
                    EngineError::UnknownChannel(channel.to_owned()).numeric(),
                    vec![channel.to_owned(), "No such channel".to_owned()],
                );
                continue;
            }
            let is_member = self
                .state
                .get()
                .channels
                .get(&key)
                .is_some_and(|c| c.members.contains(&id));
            if !is_member {
                self.send_numeric(
                    id,
                    EngineError::NotOnChannel(channel.to_owned()).numeric(),
                    vec![channel.to_owned(), "You're not on that channel".to_owned()],
                );
                continue;
            }

            let watchers = self.state.get().watchers_of_channel(&key);
            let prefix = self.prefix_of(id);
            let part = Message::from_command(Command::PART(
                channel.to_owned(),
                reason.map(str::to_owned),
            ))
            .with_prefix(prefix);
            for watcher in &watchers {
                self.send(*watcher, &part);
            }

            let st = self.state.get_mut();
            let mut drop_channel = false;
            if let Some(chan) = st.channels.get_mut(&key) {
                chan.members.remove(&id);
                chan.memberships.remove(&id);
                drop_channel = chan.members.is_empty();
            }
            if drop_channel {
                st.channels.remove(&key);
            }
        }
    }

    fn handle_kick(&mut self, id: ConnectionId, channel: &str, nickname: &str, reason: Option<&str>) {
        let key = self.state.get().fold(channel);
        let Some(target) = self.state.get().nickname_index.get(&self.state.get().fold(nickname)).copied() else {
            self.send_numeric(
                id,
                Response::ERR_NOSUCHNICK,
                vec![nickname.to_owned(), "No such nick".to_owned()],
            );
            return;
        };
        let on_channel = self
            .state
            .get()
            .channels
            .get(&key)
            .is_some_and(|c| c.members.contains(&target));
        if !on_channel {
            self.send_numeric(
                id,
                EngineError::NotOnChannel(channel.to_owned()).numeric(),
                vec![channel.to_owned(), "They aren't on that channel".to_owned()],
            );
            return;
        }
        let watchers = self.state.get().watchers_of_channel(&key);
        let prefix = self.prefix_of(id);
        let reason = reason.map(str::to_owned).unwrap_or_else(|| self.nick_of(id));
        let kick = Message::from_command(Command::KICK(
            channel.to_owned(),
            nickname.to_owned(),
            Some(reason),
        ))
        .with_prefix(prefix);
        for watcher in &watchers {
            self.send(*watcher, &kick);
        }

        let st = self.state.get_mut();
        let mut drop_channel = false;
        if let Some(chan) = st.channels.get_mut(&key) {
            chan.members.remove(&target);
            chan.memberships.remove(&target);
            drop_channel = chan.members.is_empty();
        }
        if drop_channel {
            st.channels.remove(&key);
        }
    }

    // ---- MODE (store-driven per §4.2/§4.5, via mode::dynamic) ----------

    /// Reconstructs a raw modestring + args list from the codec's typed
    /// `Vec<Mode<ChannelMode>>` and reinterprets it through
    /// [`apply_mode_string`] against the connection's negotiated
    /// `CHANMODES`/`PREFIX`, since the typed variants' `takes_arg()` is
    /// hardcoded to RFC 2812 and ignores what the network actually
    /// negotiated.
    fn handle_channel_mode(&mut self, id: ConnectionId, target: &str, modes: &[Mode<ChannelMode>]) {
        if modes.is_empty() {
            // A bare `MODE #chan` query; nothing to reinterpret.
            return;
        }

        let mut flags = String::new();
        let mut args = Vec::new();
        let mut last_add: Option<bool> = None;
        for m in modes {
            let add = !m.is_minus();
            let letter = m.mode().to_string().chars().next().unwrap_or('?');
            if last_add != Some(add) {
                flags.push(if add { '+' } else { '-' });
                last_add = Some(add);
            }
            flags.push(letter);
            if let Some(a) = m.arg() {
                args.push(a.to_owned());
            }
        }

        let key = self.state.get().fold(target);
        let mut pieces: Vec<&str> = vec![&flags];
        pieces.extend(args.iter().map(String::as_str));
        let changes = apply_mode_string(&self.state.get().parameters, &pieces);

        let prefix = self.prefix_of(id);
        let watchers = self.state.get().watchers_of_channel(&key);
        let announce = Message::from_command(Command::ChannelMODE(target.to_owned(), modes.to_vec()))
            .with_prefix(prefix);
        for watcher in &watchers {
            self.send(*watcher, &announce);
        }

        let st = self.state.get_mut();
        let Some(chan) = st.channels.get_mut(&key) else {
            return;
        };
        for change in changes {
            match change.target {
                DynamicModeTarget::Membership => {
                    if let Some(arg) = &change.arg {
                        let member_key = crate::casemap::irc_to_lower(arg);
                        if let Some(member_id) = st.nickname_index.get(&member_key).copied() {
                            let membership = chan.memberships.entry(member_id).or_default();
                            if change.add {
                                membership.insert(change.letter);
                            } else {
                                membership.remove(&change.letter);
                            }
                        }
                    }
                }
                DynamicModeTarget::List => {
                    if let Some(arg) = change.arg {
                        let set = chan.list_values.entry(change.letter).or_default();
                        if change.add {
                            set.insert(arg);
                        } else {
                            set.remove(&arg);
                        }
                    }
                }
                DynamicModeTarget::Setting | DynamicModeTarget::SettingOnSet => {
                    if change.add {
                        if let Some(arg) = change.arg {
                            chan.settings.insert(change.letter, arg);
                        }
                    } else {
                        chan.settings.remove(&change.letter);
                    }
                }
                DynamicModeTarget::Flag => {
                    if change.add {
                        chan.flags.insert(change.letter);
                    } else {
                        chan.flags.remove(&change.letter);
                    }
                }
                DynamicModeTarget::Unknown => {}
            }
        }
    }

    // ---- TOPIC ----------------------------------------------------------

    fn handle_topic(&mut self, id: ConnectionId, channel: &str, topic: Option<&str>) {
        let key = self.state.get().fold(channel);
        if !self.state.get().channels.contains_key(&key) {
            self.send_numeric(
                id,
                EngineError::UnknownChannel(channel.to_owned()).numeric(),
                vec![channel.to_owned(), "No such channel".to_owned()],
            );
            return;
        }
        match topic {
            None => {
                let (text, who, at) = {
                    let chan = self.state.get().channels.get(&key).unwrap();
                    (chan.topic.clone(), chan.topic_set_by.clone(), chan.topic_set_at)
                };
                match text {
                    Some(text) => {
                        self.send_numeric(id, Response::RPL_TOPIC, vec![channel.to_owned(), text]);
                        if let (Some(who), Some(at)) = (who, at) {
                            self.send_numeric(
                                id,
                                Response::RPL_TOPICWHOTIME,
                                vec![channel.to_owned(), who, at.to_string()],
                            );
                        }
                    }
                    None => {
                        self.send_numeric(
                            id,
                            Response::RPL_NOTOPIC,
                            vec![channel.to_owned(), "No topic is set".to_owned()],
                        );
                    }
                }
            }
            Some(text) => {
                let nick = self.nick_of(id);
                let now = self
                    .state
                    .get()
                    .connections
                    .get(&id)
                    .map(|c| c.last_pong)
                    .unwrap_or_default();
                let st = self.state.get_mut();
                if let Some(chan) = st.channels.get_mut(&key) {
                    chan.topic = Some(text.to_owned());
                    chan.topic_set_by = Some(nick.clone());
                    chan.topic_set_at = Some(now);
                }
                let watchers = st.watchers_of_channel(&key);
                let prefix = Prefix::new(nick);
                let announce = Message::from_command(Command::TOPIC(
                    channel.to_owned(),
                    Some(text.to_owned()),
                ))
                .with_prefix(prefix);
                for watcher in &watchers {
                    self.send(*watcher, &announce);
                }
            }
        }
    }

    // ---- Message routing (§4.5) ----------------------------------------

    fn route_text(
        &mut self,
        id: ConnectionId,
        target: &str,
        text: &str,
        tags: Option<&[Tag]>,
        is_notice: bool,
    ) {
        let chantypes: Vec<char> = self.state.get().parameters.channel_types.iter().copied().collect();
        let is_channel = is_channel_name_with(target, &chantypes);

        let recipients: Vec<ConnectionId> = if is_channel {
            let key = self.state.get().fold(target);
            self.state
                .get()
                .channels
                .get(&key)
                .map(|c| c.members.iter().copied().filter(|m| *m != id).collect())
                .unwrap_or_default()
        } else {
            let key = self.state.get().fold(target);
            self.state
                .get()
                .nickname_index
                .get(&key)
                .copied()
                .into_iter()
                .collect()
        };

        if !is_channel && recipients.is_empty() {
            if !is_notice {
                self.send_numeric(
                    id,
                    Response::ERR_NOSUCHNICK,
                    vec![target.to_owned(), "No such nick/channel".to_owned()],
                );
            }
            return;
        }
        if is_channel {
            let key = self.state.get().fold(target);
            if !self.state.get().channels.contains_key(&key) {
                if !is_notice {
                    self.send_numeric(
                        id,
                        EngineError::UnknownChannel(target.to_owned()).numeric(),
                        vec![target.to_owned(), "No such channel".to_owned()],
                    );
                }
                return;
            }
        }

        let prefix = self.prefix_of(id);
        let command = if is_notice {
            Command::NOTICE(target.to_owned(), text.to_owned())
        } else {
            Command::PRIVMSG(target.to_owned(), text.to_owned())
        };

        let client_tags: Vec<Tag> = tags
            .unwrap_or(&[])
            .iter()
            .filter(|t| t.key.starts_with('+'))
            .cloned()
            .collect();

        for recipient in &recipients {
            let forwarded = self.build_forwarded(&command, &client_tags, &prefix, *recipient);
            self.send(*recipient, &forwarded);
        }

        let echo_active = self
            .state
            .get()
            .connections
            .get(&id)
            .is_some_and(|c| c.active_caps.contains("echo-message"));
        if echo_active && !is_notice {
            let echo = self.build_forwarded(&command, &client_tags, &prefix, id);
            self.send(id, &echo);
        }
    }

    /// Builds the per-recipient message for PRIVMSG/NOTICE fan-out: `+`-prefixed
    /// client tags are preserved verbatim (the client-sent `time`, if any, is
    /// not among them and is dropped), plus a server-generated `time` tag when
    /// the recipient negotiated server-time (§4.5 "Tag forwarding").
    fn build_forwarded(
        &self,
        command: &Command,
        client_tags: &[Tag],
        prefix: &Prefix,
        recipient: ConnectionId,
    ) -> Message {
        let mut msg = Message::from_command(command.clone()).with_prefix(prefix.clone());
        for tag in client_tags {
            msg = msg.with_tag(tag.key.clone(), tag.value.clone());
        }
        let has_server_time = self
            .state
            .get()
            .connections
            .get(&recipient)
            .is_some_and(|c| c.active_caps.contains("server-time"));
        if has_server_time {
            msg = msg.with_tag("time", Some(crate::ircv3::format_server_time()));
        }
        msg
    }

    fn handle_away(&mut self, id: ConnectionId, message: Option<String>) {
        if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
            conn.away_message = message.clone();
        }
        match message {
            Some(_) => self.send_numeric(
                id,
                Response::RPL_NOWAWAY,
                vec!["You have been marked as being away".to_owned()],
            ),
            None => self.send_numeric(
                id,
                Response::RPL_UNAWAY,
                vec!["You are no longer marked as being away".to_owned()],
            ),
        }
        let watchers = self.state.get().watchers_of_connection(id);
        let nick = self.nick_of(id);
        let prefix = Prefix::new(nick);
        let announce = Message::from_command(Command::AWAY(
            self.state.get().connections.get(&id).and_then(|c| c.away_message.clone()),
        ))
        .with_prefix(prefix);
        for watcher in &watchers {
            let active = self
                .state
                .get()
                .connections
                .get(watcher)
                .is_some_and(|c| c.active_caps.contains("away-notify"));
            if active {
                self.send(*watcher, &announce);
            }
        }
    }

    // ---- Ping watchdog (§4.5, §5 "Cancellation and timeout") -----------

    fn handle_ping(&mut self, id: ConnectionId, token: &str) {
        if token.is_empty() {
            self.send_numeric(
                id,
                Response::ERR_NEEDMOREPARAMS,
                vec!["PING".to_owned(), "not enough parameters".to_owned()],
            );
            return;
        }
        let pong = Message::from_command(Command::PONG(
            self.config.server_name.clone(),
            Some(token.to_owned()),
        ))
        .with_prefix(Prefix::new(self.config.server_name.clone()));
        self.send(id, &pong);
    }

    fn handle_pong(&mut self, id: ConnectionId, token: &str, _now_ms: u64) {
        let Ok(value) = token.parse::<u64>() else {
            return;
        };
        if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
            if value >= conn.last_pong && value <= conn.last_ping {
                conn.last_pong = value;
            }
        }
    }

    /// Periodic sweep (§4.5 "PING watchdog"): pings idle connections, closes
    /// ones that never answered the last ping within `max_idle_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        if self.engine_state != ServerEngineState::Active {
            return;
        }
        let due: Vec<ConnectionId> = self
            .state
            .get()
            .connections
            .iter()
            .filter(|(_, c)| now_ms.saturating_sub(c.last_ping) >= self.config.ping_frequency_ms)
            .map(|(id, _)| *id)
            .collect();
        for id in due {
            let overdue = self
                .state
                .get()
                .connections
                .get(&id)
                .is_some_and(|c| now_ms.saturating_sub(c.last_pong) >= self.config.max_idle_ms);
            if overdue {
                if let Some(conn) = self.connections.get(&id) {
                    conn.close_deferred();
                }
                self.close_connection(id);
                continue;
            }
            let ping = Message::from_command(Command::PING(
                self.config.server_name.clone(),
                Some(now_ms.to_string()),
            ));
            self.send(id, &ping);
            if let Some(conn) = self.state.get_mut().connections.get_mut(&id) {
                conn.last_ping = now_ms;
            }
        }
    }

    fn handle_quit(&mut self, id: ConnectionId, reason: Option<String>) {
        let watchers = self.state.get().watchers_of_connection(id);
        let prefix = self.prefix_of(id);
        let quit = Message::from_command(Command::QUIT(reason)).with_prefix(prefix);
        for watcher in &watchers {
            if *watcher != id {
                self.send(*watcher, &quit);
            }
        }
        if let Some(conn) = self.connections.get(&id) {
            conn.close_deferred();
        }
        self.close_connection(id);
    }
}
