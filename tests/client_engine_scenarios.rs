//! Client Engine integration tests covering the concrete scenarios
//! enumerated in spec.md §8 that need the crate's public surface rather than
//! the inline unit tests already covering basic registration/JOIN/PING.

use ircforge::{
    ChannelMode, ClientConfig, ClientEngine, Command, CtcpKind, Message, MessageKind, Mode,
    ModeType, Prefix, Response,
};

fn engine() -> ClientEngine {
    ClientEngine::new(ClientConfig {
        nickname: "tester".into(),
        username: "tester".into(),
        realname: "Tester".into(),
        password: None,
        request_caps: vec![],
        ..Default::default()
    })
}

/// §8 scenario 1: a multi-message CAP LS exchange (two continuations, then a
/// final empty, non-continued LS) collects the full advertised set before
/// requesting it, and a matching ACK ends negotiation.
#[test]
fn cap_negotiation_collects_across_continuations_then_acks() {
    let mut eng = engine();
    let _ = eng.start();

    let ls1 = Message::from_command(Command::CAP(
        None,
        ircforge::CapSubCommand::LS,
        Some("*".to_owned()),
        Some("multi-prefix sasl".to_owned()),
    ));
    let (out1, _) = eng.handle_message(&ls1, 0);
    assert!(out1.is_empty(), "still more LS continuations expected");

    let ls2 = Message::from_command(Command::CAP(
        None,
        ircforge::CapSubCommand::LS,
        Some("*".to_owned()),
        Some("server-time".to_owned()),
    ));
    let (out2, _) = eng.handle_message(&ls2, 0);
    assert!(out2.is_empty());

    let ls3 = Message::from_command(Command::CAP(
        None,
        ircforge::CapSubCommand::LS,
        None,
        Some(String::new()),
    ));
    let (out3, _) = eng.handle_message(&ls3, 0);
    let Some(Command::CAP(_, ircforge::CapSubCommand::REQ, _, Some(names))) = out3[0].command()
    else {
        panic!("expected a CAP REQ after the final LS, got {:?}", out3[0].command());
    };
    let mut requested: Vec<&str> = names.split_whitespace().collect();
    requested.sort_unstable();
    assert_eq!(requested, ["multi-prefix", "sasl", "server-time"]);

    let ack = Message::from_command(Command::CAP(
        None,
        ircforge::CapSubCommand::ACK,
        None,
        Some("multi-prefix sasl server-time".to_owned()),
    ));
    let (out4, _) = eng.handle_message(&ack, 0);
    assert!(matches!(
        out4[0].command(),
        Some(Command::CAP(_, ircforge::CapSubCommand::END, _, _))
    ));
}

/// §8 scenario 2: `+ov` grants membership modes to two nicks; `-o+b` revokes
/// one membership mode and adds a ban to the channel's type-A list.
#[test]
fn mode_with_multiple_argumented_chars() {
    let mut eng = engine();
    let _ = eng.start();

    let isupport = Message::new(
        "005",
        MessageKind::Command(Command::Response(
            Response::RPL_ISUPPORT,
            vec![
                "tester".to_owned(),
                "PREFIX=(ov)@+".to_owned(),
                "CHANMODES=beI,k,l,imnpst".to_owned(),
                "are supported by this server".to_owned(),
            ],
        )),
    );
    let _ = eng.handle_message(&isupport, 0);

    let join = Message::from_command(Command::JOIN("#chan".to_owned(), None, None))
        .with_prefix(Prefix::new_from_str("tester!t@host"));
    let _ = eng.handle_message(&join, 0);

    let modes = vec![
        Mode::plus(ChannelMode::from_char('o'), Some("alice")),
        Mode::plus(ChannelMode::from_char('v'), Some("bob")),
    ];
    let mode_msg = Message::from_command(Command::ChannelMODE("#chan".to_owned(), modes))
        .with_prefix(Prefix::new_from_str("op!o@host"));
    let _ = eng.handle_message(&mode_msg, 0);

    let chan = &eng.state().channels["#chan"];
    assert!(chan.members.get("alice").is_some_and(|m| m.contains(&'o')));
    assert!(chan.members.get("bob").is_some_and(|m| m.contains(&'v')));

    let modes2 = vec![
        Mode::minus(ChannelMode::from_char('o'), Some("alice")),
        Mode::plus(ChannelMode::from_char('b'), Some("*!*@bad")),
    ];
    let mode_msg2 = Message::from_command(Command::ChannelMODE("#chan".to_owned(), modes2))
        .with_prefix(Prefix::new_from_str("op!o@host"));
    let _ = eng.handle_message(&mode_msg2, 0);

    let chan = &eng.state().channels["#chan"];
    assert!(!chan.members.get("alice").is_some_and(|m| m.contains(&'o')));
    assert!(chan.list_values.get(&'b').is_some_and(|set| set.contains("*!*@bad")));
}

/// §8 scenario 6: a CTCP DCC SEND payload lifts filename/host/port/filesize.
#[test]
fn dcc_send_parse() {
    let line = "\u{1}DCC SEND \"my file.txt\" 3232235777 12345 4096\u{1}";
    let ctcp = ircforge::Ctcp::parse(line).expect("valid CTCP payload");
    assert_eq!(ctcp.kind, CtcpKind::DccSend);
    let params = ctcp.params.expect("DCC carries a params tail");
    let send = ircforge::ctcp::parse_dcc_send(params).expect("well-formed DCC SEND");
    assert_eq!(send.filename, "my file.txt");
    assert_eq!(send.host, "3232235777");
    assert_eq!(send.port, 12345);
    assert_eq!(send.filesize, 4096);
}
