//! Server Engine integration tests covering the concrete scenarios enumerated
//! in spec.md §8 that exercise multi-connection fan-out, the PING watchdog,
//! and tag forwarding — behaviour that can't be observed from a single
//! connection's inline unit tests.

use std::sync::{Arc, Mutex};

use ircforge::{Connection, ServerConfig, ServerEngine};

#[derive(Default)]
struct RecordingConnection {
    offered: Mutex<Vec<String>>,
}

impl RecordingConnection {
    fn lines(&self) -> Vec<String> {
        self.offered.lock().unwrap().clone()
    }
}

impl Connection for RecordingConnection {
    fn offer(&self, line: String) -> bool {
        self.offered.lock().unwrap().push(line);
        true
    }
    fn add_ingress_handler(&self, _handler: Box<dyn Fn(String) + Send + Sync>) {}
    fn add_shutdown_handler(&self, _handler: Box<dyn Fn() + Send + Sync>) {}
    fn start(&self) {}
    fn close(&self) {}
    fn close_deferred(&self) {}
}

struct Handle(Arc<RecordingConnection>);

impl Connection for Handle {
    fn offer(&self, line: String) -> bool {
        self.0.offer(line)
    }
    fn add_ingress_handler(&self, handler: Box<dyn Fn(String) + Send + Sync>) {
        self.0.add_ingress_handler(handler)
    }
    fn add_shutdown_handler(&self, handler: Box<dyn Fn() + Send + Sync>) {
        self.0.add_shutdown_handler(handler)
    }
    fn start(&self) {
        self.0.start()
    }
    fn close(&self) {
        self.0.close()
    }
    fn close_deferred(&self) {
        self.0.close_deferred()
    }
}

fn accept(eng: &mut ServerEngine, now_ms: u64) -> (ircforge::ConnectionId, Arc<RecordingConnection>) {
    let recorder = Arc::new(RecordingConnection::default());
    let id = eng.accept(Box::new(Handle(recorder.clone())), now_ms);
    (id, recorder)
}

fn register(eng: &mut ServerEngine, id: ircforge::ConnectionId, nick: &str) {
    eng.handle_line(id, &format!("NICK {nick}"), 0);
    eng.handle_line(id, &format!("USER {nick} 0 * :{nick} Real"), 0);
}

/// §8 scenario 3: JOIN fan-out to existing watchers, re-JOIN is a no-op, and
/// the newcomer gets topic + NAMES + ENDOFNAMES.
#[test]
fn join_fan_out_to_watchers() {
    let mut eng = ServerEngine::new(ServerConfig::default());
    let (c1, alice) = accept(&mut eng, 0);
    let (c2, bob) = accept(&mut eng, 0);
    let (c3, carol) = accept(&mut eng, 0);
    register(&mut eng, c1, "alice");
    register(&mut eng, c2, "bob");
    register(&mut eng, c3, "carol");

    eng.handle_line(c1, "JOIN #c", 0);
    eng.handle_line(c2, "JOIN #c", 0);

    // Re-JOIN of an existing member is a no-op: no second JOIN broadcast to alice.
    let alice_before = alice.lines().len();
    eng.handle_line(c2, "JOIN #c", 0);
    assert_eq!(alice.lines().len(), alice_before);

    eng.handle_line(c3, "JOIN #c", 0);

    let join_line = ":carol JOIN #c";
    assert!(alice.lines().iter().any(|l| l.contains(join_line)));
    assert!(bob.lines().iter().any(|l| l.contains(join_line)));
    assert!(carol.lines().iter().any(|l| l.contains(join_line)));

    let carol_lines = carol.lines();
    assert!(carol_lines.iter().any(|l| l.contains(" 366 ")));
    assert!(carol_lines
        .iter()
        .any(|l| l.contains(" 353 ") && l.contains("#c")));

    assert!(eng.state().channels.contains_key("#c"));
}

/// §8 scenario 4: the watchdog pings an idle connection, advances on PONG,
/// and force-closes a connection that never answers within max_idle_ms.
#[test]
fn ping_watchdog_closes_unanswered_connection() {
    let mut config = ServerConfig::default();
    config.ping_frequency_ms = 60_000;
    config.max_idle_ms = 300_000;
    let mut eng = ServerEngine::new(config);
    let (id, conn) = accept(&mut eng, 0);

    eng.tick(60_000);
    assert!(conn.lines().iter().any(|l| l.contains("PING") && l.contains("60000")));

    eng.handle_line(id, "PONG :60000", 60_000);
    assert!(eng.state().connections.get(&id).is_some());

    eng.tick(360_000);
    assert!(eng.state().connections.get(&id).is_none());
}

/// §8 scenario 5: `+`-prefixed client tags survive fan-out, the client-sent
/// `time` tag is dropped, and a server-time-capable recipient gets a
/// server-generated `time` tag instead.
#[test]
fn tag_forwarding_preserves_plus_tags_and_substitutes_server_time() {
    let mut eng = ServerEngine::new(ServerConfig::default());
    let (c1, alice) = accept(&mut eng, 0);
    let (c2, bob) = accept(&mut eng, 0);
    register(&mut eng, c1, "alice");
    register(&mut eng, c2, "bob");
    eng.handle_line(c2, "CAP REQ :server-time", 0);
    eng.handle_line(c2, "CAP END", 0);

    eng.handle_line(c1, "JOIN #c", 0);
    eng.handle_line(c2, "JOIN #c", 0);

    eng.handle_line(
        c1,
        "@+draft-reply=abc;time=2020-01-01T00:00:00Z PRIVMSG #c :hi",
        0,
    );

    let bob_lines = bob.lines();
    let forwarded = bob_lines
        .iter()
        .find(|l| l.contains("PRIVMSG #c :hi"))
        .expect("bob should have received the forwarded PRIVMSG");
    assert!(forwarded.contains("+draft-reply=abc"));
    assert!(forwarded.contains("time="));
    assert!(!forwarded.contains("time=2020-01-01T00:00:00Z"));
}
