use crate::error::MessageParseError;
use super::super::types::Command;
use super::connection::raw;

pub(super) fn parse(cmd: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
    let result = match cmd {
        "WHO" => match args.len() {
            0 => Command::WHO(None, None),
            1 => Command::WHO(Some(args[0].to_owned()), None),
            2 => Command::WHO(Some(args[0].to_owned()), Some(args[1] == "o")),
            _ => raw(cmd, args),
        },
        "WHOIS" => match args.len() {
            1 => Command::WHOIS(None, args[0].to_owned()),
            2 => Command::WHOIS(Some(args[0].to_owned()), args[1].to_owned()),
            _ => raw(cmd, args),
        },
        "WHOWAS" => match args.len() {
            1 => Command::WHOWAS(args[0].to_owned(), None, None),
            2 => Command::WHOWAS(args[0].to_owned(), Some(args[1].to_owned()), None),
            3 => Command::WHOWAS(
                args[0].to_owned(),
                Some(args[1].to_owned()),
                Some(args[2].to_owned()),
            ),
            _ => raw(cmd, args),
        },
        _ => unreachable!("user::parse called with non-user command: {}", cmd),
    };

    Ok(result)
}
