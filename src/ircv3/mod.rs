
pub mod msgid;
pub mod batch;
pub mod server_time;

pub use self::msgid::generate_msgid;
pub use self::batch::generate_batch_ref;
pub use self::server_time::{format_server_time, format_timestamp};
