//! The Server Engine (§4.5): connection acceptance, CAP negotiation,
//! registration, channel maintenance, message routing, and the PING
//! watchdog for a single-threaded server worker.

mod engine;
mod state;

pub use engine::{ServerEngine, ServerEngineState};
pub use state::{ConnectionId, ConnectionState, Membership, ServerChannel, ServerState};
