//! The Connection contract (§6): a line-oriented duplex pipe consumed by
//! both engines. Concrete I/O (TCP, TLS, WebSocket accept loops) is an
//! external collaborator's job, not this crate's — the engines only need
//! the trait below plus the sans-I/O line-limit constants the codec and
//! engines both check against.

/// Total line length cap: tags + body + CRLF, independent of the 510-byte
/// body cap and 8,191-byte tag cap (§3/§6).
pub const MAX_LINE_LEN: usize = 8_702;
/// Tag-section byte cap, checked independently of the body.
pub const MAX_TAG_LEN: usize = 8_191;
/// Body byte cap (command + params + CRLF), checked independently of tags.
pub const MAX_BODY_LEN: usize = 510;

/// A line-oriented duplex pipe owned by an external I/O collaborator.
///
/// Engines never block on I/O (§5 "Suspension points"): all egress goes
/// through the non-blocking [`Connection::offer`], and all ingress arrives
/// through a callback registered with [`Connection::add_ingress_handler`]
/// that the engine wraps with a hop onto its own worker.
pub trait Connection {
    /// Non-blocking enqueue of an outgoing line. Returns `false` iff the
    /// egress queue is closed; callers (broadcasts in particular) treat a
    /// `false` return as "this recipient is gone" and move on silently.
    fn offer(&self, line: String) -> bool;

    /// Register the line handler invoked on the I/O thread for every
    /// ingress line. The engine's registration wraps this with a worker hop
    /// so handler bodies never run on the I/O thread.
    fn add_ingress_handler(&self, handler: Box<dyn Fn(String) + Send + Sync>);

    /// Register a callback invoked exactly once after the socket has torn
    /// down. Ignored if the connection is already `Closed` when it fires.
    fn add_shutdown_handler(&self, handler: Box<dyn Fn() + Send + Sync>);

    /// Begin accepting ingress / delivering egress.
    fn start(&self);

    /// Tear down immediately, dropping any queued but undelivered egress.
    fn close(&self);

    /// Tear down after the egress queue has drained. Used by the PING
    /// watchdog so a final error line reaches the peer before the socket
    /// closes (§5 "Cancellation and timeout").
    fn close_deferred(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeConnection {
        offered: Mutex<Vec<String>>,
        closed: AtomicBool,
    }

    impl Connection for FakeConnection {
        fn offer(&self, line: String) -> bool {
            if self.closed.load(Ordering::SeqCst) {
                return false;
            }
            self.offered.lock().unwrap().push(line);
            true
        }

        fn add_ingress_handler(&self, _handler: Box<dyn Fn(String) + Send + Sync>) {}
        fn add_shutdown_handler(&self, _handler: Box<dyn Fn() + Send + Sync>) {}
        fn start(&self) {}

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn close_deferred(&self) {
            self.close();
        }
    }

    #[test]
    fn offer_after_close_returns_false() {
        let conn = FakeConnection::default();
        assert!(conn.offer("PING :x".to_owned()));
        conn.close();
        assert!(!conn.offer("PING :y".to_owned()));
        assert_eq!(conn.offered.lock().unwrap().len(), 1);
    }
}
