//! # ircforge
//!
//! A Rust library for parsing and serializing IRC protocol messages, with
//! full support for IRCv3 extensions, plus single-threaded client and
//! server engines built on top of it.
//!
//! ## Features
//!
//! - IRC message parsing with tags, prefixes, commands, and parameters
//! - IRCv3 capability negotiation and message tags
//! - Zero-copy parsing with borrowed message types, zero-copy encoding
//! - RPL_ISUPPORT parameter negotiation
//! - User and channel mode parsing, including dynamically-negotiated modes
//! - Convenient message construction with builder pattern

#![deny(clippy::all)]
// TODO: Enable once documentation coverage is complete
// #![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Creating IRC Messages
//!
//! ```rust
//! use ircforge::{Message, prefix::Prefix};
//!
//! // Basic message construction
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! let notice = Message::notice("nick", "Server notice");
//! let join = Message::join("#channel");
//!
//! // Messages with IRCv3 tags and prefixes
//! let tagged_msg = Message::privmsg("#dev", "Tagged message")
//!     .with_tag("time", Some("2023-01-01T12:00:00Z"))
//!     .with_tag("msgid", Some("abc123"))
//!     .with_prefix(Prefix::new_from_str("bot!bot@example.com"));
//!
//! println!("{}", tagged_msg); // Serializes to IRC protocol format
//! ```
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use ircforge::Message;
//!
//! let raw = "@time=2023-01-01T12:00:00Z :nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! if let Some(tags) = &message.tags {
//!     println!("Message has {} tags", tags.len());
//! }
//! ```
//!
//! ## Acknowledgments
//!
//! This project was inspired by the architectural patterns established by
//! [Aaron Weiss (aatxe)](https://github.com/aatxe) in the
//! [irc](https://github.com/aatxe/irc) crate. We are grateful for Aaron's
//! foundational work on IRC protocol handling in Rust.

pub mod caps;
pub mod chan;
pub mod client;
pub mod command;
pub mod config;
pub mod ctcp;
pub mod encode;
pub mod error;
pub mod guard;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod response;
pub mod server;
pub mod state;
pub mod transport;
pub mod util;
pub mod validation;

pub use self::caps::{Capability, CapAction, CapabilityRegistry, NegotiationVersion};
pub use self::chan::ChannelExt;
pub use self::client::{ClientCommand, ClientEngine, EngineState, UiEvent};
pub use self::command::{BatchSubCommand, CapSubCommand, Command, CommandRef, CommandRefEnum};
pub use self::config::{ClientConfig, ServerConfig};
pub use self::ctcp::{Ctcp, CtcpKind, CtcpOwned, DccSend};
pub use self::encode::IrcEncode;
pub use self::error::EngineError;
pub use self::guard::StateGuard;
pub use self::isupport::{
    CaseMapping, ChanModes, Isupport, IsupportEntry, MaxList, ParameterStore, PrefixSpec, TargMax,
};
pub use self::message::{Message, MessageKind, MessageRef, Tag};
pub use self::mode::{
    apply_mode_string, ChannelMode, DynamicModeChange, DynamicModeTarget, Mode, ModeType, UserMode,
};
pub use self::prefix::{Prefix, PrefixRef};
pub use self::response::Response;
pub use self::server::{ConnectionId, ServerChannel, ServerEngine, ServerEngineState, ServerState};
pub use self::transport::Connection;

pub mod casemap;
pub use self::casemap::{irc_to_lower, irc_eq};

pub mod ircv3;
pub use self::ircv3::{generate_msgid, generate_batch_ref, format_server_time, format_timestamp};
