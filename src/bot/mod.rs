//! Chat-bot command surface for file management.

pub mod command;
pub mod session;

pub use command::{parse_command, BotCommand};
pub use session::{ManageSession, SessionOutcome};
