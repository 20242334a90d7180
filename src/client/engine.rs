//! Client Engine (§4.4): a single-threaded cooperative loop that drives
//! registration, tracks channel/user state, and translates UI intent into
//! outgoing IRC commands.

use crate::caps::CapAction;
use crate::command::{CapSubCommand, Command};
use crate::guard::StateGuard;
use crate::config::ClientConfig;
use crate::message::{Message, MessageKind};
use crate::mode::{Mode, ModeType};
use crate::prefix::Prefix;
use crate::response::Response;

use super::state::{ClientChannel, ClientState, ClientUser};

/// Coarse connection lifecycle (§4.4 "State").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    New,
    Initializing,
    Disconnected,
    Connecting,
    Connected,
    Registered,
    Closed,
}

/// Something the engine wants the UI to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// A plain informational line (joins, parts, topic changes, ...).
    System(String),
    /// A PRIVMSG/NOTICE to show in a channel or query window.
    Chat {
        target: String,
        from: String,
        text: String,
        notice: bool,
    },
    /// A numeric or protocol-level error surfaced to the user.
    Error(String),
}

/// Commands the UI submits to the engine worker (§4.4 "Outgoing client
/// commands").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientCommand {
    Connect,
    Exit,
    Join(String, Option<String>),
    Part(String, Option<String>),
    Kick(String, String, Option<String>),
    Kill(String, Option<String>),
    Mode(String, String, Vec<String>),
    Msg(String, String),
    MsgCurrent(String),
    Notice(String, String),
    Nick(String),
    Oper(String, String),
    Quit(Option<String>),
    Topic(String, Option<String>),
    Afk(Option<String>),
    Back,
}

/// The Client Engine (§4.4): owns the registration state machine, the
/// guarded [`ClientState`], and the UI-facing focused-channel pointer used
/// by [`ClientCommand::MsgCurrent`].
pub struct ClientEngine {
    pub engine_state: EngineState,
    config: ClientConfig,
    state: StateGuard<ClientState>,
    registration_sent: bool,
    current_channel: Option<String>,
}

impl ClientEngine {
    pub fn new(config: ClientConfig) -> Self {
        ClientEngine {
            engine_state: EngineState::New,
            config,
            state: StateGuard::new(ClientState::default()),
            registration_sent: false,
            current_channel: None,
        }
    }

    pub fn state(&self) -> &ClientState {
        self.state.get()
    }

    /// Handle a UI-submitted command. Returns outgoing messages and UI
    /// events produced as a side-effect of local bookkeeping.
    pub fn handle_command(&mut self, cmd: ClientCommand) -> (Vec<Message>, Vec<UiEvent>) {
        let mut out = Vec::new();
        let events = Vec::new();

        match cmd {
            ClientCommand::Connect => {
                self.engine_state = EngineState::Connecting;
            }
            ClientCommand::Exit => {
                self.engine_state = EngineState::Closed;
            }
            ClientCommand::Quit(reason) => {
                out.push(Message::from_command(Command::QUIT(reason)));
                self.engine_state = EngineState::Closed;
            }
            ClientCommand::Join(channel, key) => {
                out.push(Message::from_command(Command::JOIN(channel, key, None)));
            }
            ClientCommand::Part(channel, reason) => {
                out.push(Message::from_command(Command::PART(channel, reason)));
            }
            ClientCommand::Kick(channel, nick, reason) => {
                out.push(Message::from_command(Command::KICK(channel, nick, reason)));
            }
            ClientCommand::Kill(nick, reason) => {
                out.push(Message::from_command(Command::KILL(
                    nick,
                    reason.unwrap_or_default(),
                )));
            }
            ClientCommand::Mode(target, modestring, args) => {
                let mut parts = vec![modestring];
                parts.extend(args);
                out.push(Message::from_command(Command::Raw("MODE".to_owned(), {
                    let mut v = vec![target];
                    v.extend(parts);
                    v
                })));
            }
            ClientCommand::Msg(target, text) => {
                out.push(Message::from_command(Command::PRIVMSG(target, text)));
            }
            ClientCommand::MsgCurrent(text) => {
                if let Some(target) = self.current_channel.clone() {
                    out.push(Message::from_command(Command::PRIVMSG(target, text)));
                }
            }
            ClientCommand::Notice(target, text) => {
                out.push(Message::from_command(Command::NOTICE(target, text)));
            }
            ClientCommand::Nick(nick) => {
                out.push(Message::from_command(Command::NICK(nick)));
            }
            ClientCommand::Oper(name, password) => {
                out.push(Message::from_command(Command::OPER(name, password)));
            }
            ClientCommand::Topic(channel, text) => {
                out.push(Message::from_command(Command::TOPIC(channel, text)));
            }
            ClientCommand::Afk(reason) => {
                out.push(Message::from_command(Command::AWAY(reason)));
            }
            ClientCommand::Back => {
                out.push(Message::from_command(Command::AWAY(None)));
            }
        }

        (out, events)
    }

    /// Begin registration (§4.4 "Initial sequence"): `CAP LS 302`, then
    /// `PASS` if configured, then `NICK`, then `USER`.
    pub fn start(&mut self) -> Vec<Message> {
        self.engine_state = EngineState::Connected;
        let mut out = vec![Message::from_command(Command::CAP(
            None,
            CapSubCommand::LS,
            Some("302".to_owned()),
            None,
        ))];
        if let Some(pass) = self.config.password.clone() {
            out.push(Message::from_command(Command::PASS(pass)));
        }
        out.push(Message::nick(self.config.nickname.clone()));
        out.push(Message::from_command(Command::USER(
            self.config.username.clone(),
            "0".to_owned(),
            self.config.realname.clone(),
        )));
        self.registration_sent = true;
        out
    }

    /// Periodic GC sweep (§4.4 "Scheduling"). Call roughly every 5 minutes.
    pub fn gc(&mut self, now_ms: u64) -> usize {
        self.state.get_mut().gc(now_ms, 5 * 60 * 1000)
    }

    /// Feed one parsed ingress message to the engine.
    pub fn handle_message(&mut self, msg: &Message, now_ms: u64) -> (Vec<Message>, Vec<UiEvent>) {
        let mut out = Vec::new();
        let mut events = Vec::new();

        // Pre-registration tolerance (§4.4): only a small allow-list is
        // dispatched while Connecting/pre-001.
        if matches!(self.engine_state, EngineState::Connecting) {
            let allowed = matches!(
                msg.command.as_str(),
                "CAP" | "PING" | "NICK" | "USER" | "001" | "ERROR"
            ) || msg.command.parse::<u16>().is_ok_and(|n| (400..500).contains(&n));
            if !allowed {
                return (out, events);
            }
        }

        let Some(command) = msg.command() else {
            return (out, events);
        };

        match command {
            Command::CAP(_, subcmd, code, params) => {
                // The capability-list text lands in whichever of `code`/
                // `params` is present: a plain "CAP * LS :caps" puts it in
                // `code`, while a continued "CAP * LS * :caps" puts the
                // `*` more-marker in `code` and the list in `params`.
                let has_more = code.as_deref() == Some("*") && params.is_some();
                let names = params.as_deref().or(code.as_deref()).unwrap_or("");
                self.handle_cap(*subcmd, names, has_more, &mut out);
            }
            Command::PING(token, _) => {
                out.push(Message::from_command(Command::PONG(token.clone(), None)));
            }
            Command::JOIN(channels, _, _) => {
                let who = msg.prefix_name().unwrap_or_default().to_owned();
                for chan in channels.split(',').filter(|c| !c.is_empty()) {
                    let key = self.state.get().fold(chan);
                    let who_key = self.state.get().fold(&who);
                    let state = self.state.get_mut();
                    let entry = state
                        .channels
                        .entry(key)
                        .or_insert_with(|| ClientChannel::new(chan));
                    entry.members.entry(who_key).or_default();
                    events.push(UiEvent::System(format!("{} joined {}", who, chan)));
                }
            }
            Command::PART(channels, reason) => {
                let who = msg.prefix_name().unwrap_or_default().to_owned();
                for chan in channels.split(',').filter(|c| !c.is_empty()) {
                    let key = self.state.get().fold(chan);
                    let who_key = self.state.get().fold(&who);
                    if let Some(entry) = self.state.get_mut().channels.get_mut(&key) {
                        entry.members.remove(&who_key);
                    }
                    events.push(UiEvent::System(match reason {
                        Some(r) => format!("{} left {} ({})", who, chan, r),
                        None => format!("{} left {}", who, chan),
                    }));
                }
            }
            Command::KICK(channel, user, reason) => {
                let key = self.state.get().fold(channel);
                let user_key = self.state.get().fold(user);
                if let Some(entry) = self.state.get_mut().channels.get_mut(&key) {
                    entry.members.remove(&user_key);
                }
                events.push(UiEvent::System(match reason {
                    Some(r) => format!("{} was kicked from {} ({})", user, channel, r),
                    None => format!("{} was kicked from {}", user, channel),
                }));
            }
            Command::ChannelMODE(target, modes) => {
                self.apply_channel_modes(target, modes);
            }
            Command::NICK(new_nick) => {
                let old = msg.prefix_name().unwrap_or_default().to_owned();
                self.rename_user(&old, new_nick, now_ms);
                events.push(UiEvent::System(format!("{} is now known as {}", old, new_nick)));
            }
            Command::PRIVMSG(target, text) | Command::NOTICE(target, text) => {
                let from = msg.prefix_name().unwrap_or_default().to_owned();
                let notice = matches!(command, Command::NOTICE(..));
                let suppress_echo = !notice
                    && self.state.get().capabilities.is_active("echo-message")
                    && self
                        .state
                        .get()
                        .me
                        .as_ref()
                        .is_some_and(|me| me.name == from);
                self.touch(&from, now_ms);
                if !suppress_echo {
                    events.push(UiEvent::Chat {
                        target: target.clone(),
                        from,
                        text: text.clone(),
                        notice,
                    });
                }
            }
            Command::QUIT(reason) => {
                let who = msg.prefix_name().unwrap_or_default().to_owned();
                let who_key = self.state.get().fold(&who);
                for chan in self.state.get_mut().channels.values_mut() {
                    chan.members.remove(&who_key);
                }
                events.push(UiEvent::System(match reason {
                    Some(r) => format!("{} has quit ({})", who, r),
                    None => format!("{} has quit", who),
                }));
            }
            Command::TOPIC(channel, topic) => {
                let key = self.state.get().fold(channel);
                let entry = self
                    .state
                    .get_mut()
                    .channels
                    .entry(key)
                    .or_insert_with(|| ClientChannel::new(channel.clone()));
                entry.topic = topic.clone();
                entry.topic_set_by = msg.prefix_name().map(str::to_owned);
                entry.topic_set_at = Some(now_ms);
                events.push(UiEvent::System(format!(
                    "topic for {}: {}",
                    channel,
                    topic.clone().unwrap_or_default()
                )));
            }
            Command::Response(resp, params) => {
                self.handle_numeric(*resp, params, now_ms, &mut events);
            }
            _ => {}
        }

        (out, events)
    }

    fn handle_cap(
        &mut self,
        subcmd: CapSubCommand,
        names: &str,
        has_more: bool,
        out: &mut Vec<Message>,
    ) {
        let pre_registration = !matches!(self.engine_state, EngineState::Registered);
        let action = {
            let caps = &mut self.state.get_mut().capabilities;
            match subcmd {
                CapSubCommand::LS => caps.ls(names, has_more, pre_registration),
                CapSubCommand::ACK => caps.ack(names, pre_registration),
                CapSubCommand::NAK => caps.nak(names, pre_registration),
                CapSubCommand::NEW => caps.new_caps(names),
                CapSubCommand::DEL => {
                    caps.del(names);
                    CapAction::None
                }
                _ => CapAction::None,
            }
        };
        match action {
            CapAction::Request(names) => {
                out.push(Message::from_command(Command::CAP(
                    None,
                    CapSubCommand::REQ,
                    None,
                    Some(names.join(" ")),
                )));
            }
            CapAction::EndNegotiation => {
                out.push(Message::from_command(Command::CAP(
                    None,
                    CapSubCommand::END,
                    None,
                    None,
                )));
            }
            CapAction::None => {}
        }
    }

    /// §4.4 MODE handling: classify each char against the negotiated
    /// parameter store and mutate member/channel mode sets accordingly.
    fn apply_channel_modes(&mut self, target: &str, modes: &[Mode<crate::mode::ChannelMode>]) {
        let key = self.state.get().fold(target);
        let state = self.state.get_mut();
        let Some(channel) = state.channels.get_mut(&key) else {
            return;
        };
        for change in modes {
            let (add, mode, arg) = match change {
                Mode::Plus(m, a) => (true, m, a.clone()),
                Mode::Minus(m, a) => (false, m, a.clone()),
                Mode::NoPrefix(m) => (true, m, None),
            };
            if !mode.takes_arg() {
                continue;
            }
            let Some(arg) = arg else {
                tracing::debug!(?mode, "MODE argument missing, skipping");
                continue;
            };
            let letter = mode.to_string().chars().next().unwrap_or('?');
            if mode.is_list_mode() {
                let set = channel.list_values.entry(letter).or_default();
                if add {
                    set.insert(arg);
                } else {
                    set.remove(&arg);
                }
            } else {
                let member_key = crate::casemap::irc_to_lower(&arg);
                let entry = channel.members.entry(member_key).or_default();
                if add {
                    entry.insert(letter);
                } else {
                    entry.remove(&letter);
                }
            }
        }
    }

    fn rename_user(&mut self, old: &str, new: &str, now_ms: u64) {
        let state = self.state.get_mut();
        let old_key = crate::casemap::irc_to_lower(old);
        let new_key = crate::casemap::irc_to_lower(new);
        if let Some(mut user) = state.users.remove(&old_key) {
            user.nickname = new.to_owned();
            user.last_touched_ms = now_ms;
            state.users.insert(new_key.clone(), user);
        }
        for chan in state.channels.values_mut() {
            if let Some(modes) = chan.members.remove(&old_key) {
                chan.members.insert(new_key.clone(), modes);
            }
        }
        if let Some(me) = state.me.as_mut() {
            if crate::casemap::irc_to_lower(&me.name) == old_key {
                me.name = new.to_owned();
            }
        }
    }

    fn touch(&mut self, nick: &str, now_ms: u64) {
        let key = crate::casemap::irc_to_lower(nick);
        let state = self.state.get_mut();
        state
            .users
            .entry(key)
            .and_modify(|u| u.last_touched_ms = now_ms)
            .or_insert_with(|| ClientUser::new(nick, now_ms));
    }

    fn handle_numeric(
        &mut self,
        resp: Response,
        params: &[String],
        now_ms: u64,
        events: &mut Vec<UiEvent>,
    ) {
        match resp {
            Response::RPL_WELCOME => {
                self.engine_state = EngineState::Registered;
                if let Some(nick) = params.first() {
                    self.state.get_mut().me = Some(Prefix::new_from_str(nick));
                }
                events.push(UiEvent::System("Welcome, registration complete".to_owned()));
            }
            Response::RPL_ISUPPORT => {
                // All but the first (nick) and last (human text) params are
                // TOKEN[=value] entries.
                let state = self.state.get_mut();
                for tok in params.iter().skip(1).rev().skip(1).rev() {
                    let (name, value) = match tok.split_once('=') {
                        Some((n, v)) => (n, Some(v)),
                        None => (tok.as_str(), None),
                    };
                    state.parameters.apply(name, value);
                }
            }
            Response::RPL_NAMREPLY => {
                if let [_, _, channel, names] = params {
                    self.ingest_names(channel, names, now_ms);
                }
            }
            Response::RPL_AWAY => {
                if let [nick, message] = params {
                    let key = crate::casemap::irc_to_lower(nick);
                    let state = self.state.get_mut();
                    state
                        .users
                        .entry(key)
                        .or_insert_with(|| ClientUser::new(nick, now_ms))
                        .away = true;
                    events.push(UiEvent::System(format!("{} is away: {}", nick, message)));
                }
            }
            Response::RPL_NOTOPIC | Response::RPL_TOPIC | Response::RPL_TOPICWHOTIME => {
                // Handled uniformly: last param carries the useful text.
                if let Some(text) = params.last() {
                    events.push(UiEvent::System(text.clone()));
                }
            }
            r if (400..500).contains(&r.code()) => {
                events.push(UiEvent::Error(
                    params.last().cloned().unwrap_or_else(|| resp.to_string()),
                ));
            }
            _ => {}
        }
    }

    fn ingest_names(&mut self, channel: &str, names: &str, now_ms: u64) {
        let key = self.state.get().fold(channel);
        let prefixes: Vec<(char, char)> = self.state.get().parameters.prefixes.clone();
        let state = self.state.get_mut();
        let entry = state
            .channels
            .entry(key)
            .or_insert_with(|| ClientChannel::new(channel.to_owned()));
        for token in names.split_whitespace() {
            let (symbol, nick) = match token.chars().next() {
                Some(c) if prefixes.iter().any(|(_, sym)| *sym == c) => {
                    (Some(c), &token[c.len_utf8()..])
                }
                _ => (None, token),
            };
            let mode_char = symbol.and_then(|sym| {
                prefixes.iter().find(|(_, s)| *s == sym).map(|(m, _)| *m)
            });
            let nick_key = crate::casemap::irc_to_lower(nick);
            let modes = entry.members.entry(nick_key.clone()).or_default();
            if let Some(m) = mode_char {
                modes.insert(m);
            }
            state
                .users
                .entry(nick_key)
                .or_insert_with(|| ClientUser::new(nick, now_ms));
        }
    }
}
