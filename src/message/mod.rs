mod borrowed;
mod nom_parser;
mod parse;
mod serialize;
pub mod tags;
mod types;

pub use self::borrowed::MessageRef;
pub use self::parse::parse as parse_line;
pub use self::types::{Message, MessageKind, Tag};
