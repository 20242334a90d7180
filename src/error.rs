//! Error types for the IRC protocol library.
//!
//! This module defines error types for protocol-level errors,
//! message parsing failures, and mode parsing issues.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// Message exceeded maximum allowed length.
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    /// Illegal control character in message.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// Not enough arguments for command.
    #[error("not enough arguments: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Expected number of arguments.
        expected: usize,
        /// Actual number of arguments.
        got: usize,
    },

    /// An argument was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown command name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid mode argument.
    #[error("invalid mode argument: {0}")]
    InvalidModeArg(String),

    /// Failed to parse mode string.
    #[error("invalid mode string: {string}")]
    InvalidModeString {
        /// The raw mode string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: ModeParseError,
    },

    /// Invalid subcommand for a command.
    #[error("invalid {cmd} subcommand: {sub}")]
    InvalidSubcommand {
        /// The parent command name.
        cmd: &'static str,
        /// The invalid subcommand.
        sub: String,
    },

    /// Invalid message prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Parsing error with detailed context information.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Character position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
        /// Optional source error that caused this failure.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        /// Preserved source error message for Clone support.
        /// When cloning, the boxed error cannot be cloned, but this field
        /// preserves the error message for debugging purposes.
        source_message: Option<String>,
    },
}

impl Clone for MessageParseError {
    fn clone(&self) -> Self {
        match self {
            MessageParseError::EmptyMessage => MessageParseError::EmptyMessage,
            MessageParseError::InvalidCommand => MessageParseError::InvalidCommand,
            MessageParseError::NotEnoughArguments { expected, got } => {
                MessageParseError::NotEnoughArguments {
                    expected: *expected,
                    got: *got,
                }
            }
            MessageParseError::InvalidArgument(s) => MessageParseError::InvalidArgument(s.clone()),
            MessageParseError::UnknownCommand(s) => MessageParseError::UnknownCommand(s.clone()),
            MessageParseError::InvalidModeArg(s) => MessageParseError::InvalidModeArg(s.clone()),
            MessageParseError::InvalidModeString { string, cause } => {
                MessageParseError::InvalidModeString {
                    string: string.clone(),
                    cause: cause.clone(),
                }
            }
            MessageParseError::InvalidSubcommand { cmd, sub } => {
                MessageParseError::InvalidSubcommand {
                    cmd,
                    sub: sub.clone(),
                }
            }
            MessageParseError::InvalidPrefix(s) => MessageParseError::InvalidPrefix(s.clone()),
            MessageParseError::ParseContext {
                position,
                context,
                source,
                source_message,
            } => {
                // We can't clone the boxed error, but we preserve the error message
                let preserved_message = source_message.clone().or_else(|| {
                    source.as_ref().map(|e| e.to_string())
                });
                MessageParseError::ParseContext {
                    position: *position,
                    context: context.clone(),
                    source: None,
                    source_message: preserved_message,
                }
            }
        }
    }
}

/// `IllegalState`-class failures (§7): state invariant violations that an
/// engine maps 1:1 onto a numeric (server) or a system message (client)
/// rather than propagating as an exception.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// Command targeted a channel the engine has no record of.
    #[error("no such channel: {0}")]
    UnknownChannel(String),

    /// Command required membership in a channel the caller isn't in.
    #[error("not on channel: {0}")]
    NotOnChannel(String),

    /// Command requires a registered connection, issued before registration
    /// completed.
    #[error("not registered")]
    NotRegistered,

    /// PASS did not match the configured server password.
    #[error("password mismatch")]
    PasswordMismatch,

    /// Nickname is already in use (case-folded).
    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    /// Supplied nickname failed grammar validation.
    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),

    /// Command issued before the engine finished registering.
    #[error("already registered")]
    AlreadyRegistered,
}

impl EngineError {
    /// The server-engine numeric this failure maps to (§7/§4.5).
    pub fn numeric(&self) -> crate::response::Response {
        use crate::response::Response;
        match self {
            EngineError::UnknownChannel(_) => Response::ERR_NOSUCHCHANNEL,
            EngineError::NotOnChannel(_) => Response::ERR_NOTONCHANNEL,
            EngineError::NotRegistered => Response::ERR_NOTREGISTERED,
            EngineError::PasswordMismatch => Response::ERR_PASSWDMISMATCH,
            EngineError::NicknameInUse(_) => Response::ERR_NICKNAMEINUSE,
            EngineError::ErroneousNickname(_) => Response::ERR_ERRONEOUSNICKNAME,
            EngineError::AlreadyRegistered => Response::ERR_ALREADYREGISTERED,
        }
    }
}

/// Errors encountered when parsing mode strings.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ModeParseError {
    /// Invalid mode modifier character (not + or -).
    #[error("invalid mode modifier: {modifier}")]
    InvalidModeModifier {
        /// The invalid modifier character.
        modifier: char,
    },

    /// Missing mode modifier (+ or -).
    #[error("missing mode modifier")]
    MissingModeModifier,
}
