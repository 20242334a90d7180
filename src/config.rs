//! Plain-data configuration structs (§A.3). Loading these from a file or
//! CLI flags is delegated to an external collaborator (§6); this crate only
//! defines the shape and the documented defaults.

/// Server startup surface (§6): everything a server engine needs before it
/// can start accepting connections.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    pub password: Option<String>,
    pub server_name: String,
    pub network_name: String,
    /// ISUPPORT tokens applied once at startup, before any connection.
    pub isupport_seed: Vec<(String, Option<String>)>,
    pub operator_credentials: Vec<(String, String)>,
    pub motd_file: Option<String>,
    pub nickname_history_depth: usize,
    pub dcc_port_range: Option<(u16, u16)>,
    pub ping_frequency_ms: u64,
    pub max_idle_ms: u64,
    pub gc_interval_ms: u64,
    pub welcome_greeting: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_host: "0.0.0.0".to_owned(),
            port: 6667,
            password: None,
            server_name: "irc.localhost".to_owned(),
            network_name: "SlircNet".to_owned(),
            isupport_seed: Vec::new(),
            operator_credentials: Vec::new(),
            motd_file: None,
            nickname_history_depth: 0,
            dcc_port_range: None,
            ping_frequency_ms: 60_000,
            max_idle_ms: 300_000,
            gc_interval_ms: 300_000,
            welcome_greeting: "Welcome to the server".to_owned(),
        }
    }
}

impl ServerConfig {
    /// `400 / nick_len` members per NAMES chunk (§4.5), using the
    /// negotiated/default nick length cap as `nick_len`.
    pub fn names_chunk_size(&self, nick_len: usize) -> usize {
        (400 / nick_len.max(1)).max(1)
    }

    /// `005` tokens are chunked at this many parameters per line (§4.5).
    pub const ISUPPORT_CHUNK_SIZE: usize = 13;
}

/// Per-connection client configuration: registration identity plus timing.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub nickname: String,
    pub username: String,
    pub realname: String,
    pub password: Option<String>,
    pub request_caps: Vec<String>,
    pub gc_interval_ms: u64,
    pub idle_gc_threshold_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            password: None,
            request_caps: vec![
                "message-tags".to_owned(),
                "server-time".to_owned(),
                "echo-message".to_owned(),
                "away-notify".to_owned(),
                "cap-notify".to_owned(),
            ],
            gc_interval_ms: 300_000,
            idle_gc_threshold_ms: 300_000,
        }
    }
}
