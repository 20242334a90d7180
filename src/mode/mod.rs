//! User and channel mode parsing (§4.1, §4.4, §4.5).
//!
//! [`types`] carries the well-known RFC 2812 mode set used by the command
//! grammar (`Command::UserMODE`/`ChannelMODE`). [`dynamic`] interprets a raw
//! MODE string against a negotiated [`crate::isupport::ParameterStore`]'s
//! `CHANMODES`/`PREFIX`, for servers and clients that must honour whatever
//! the other side actually advertised rather than this crate's built-in set.

mod dynamic;
mod parse;
mod types;

pub use self::dynamic::{DynamicModeChange, DynamicModeTarget, apply_mode_string};
pub use self::types::{ChannelMode, Mode, ModeType, UserMode};
