//! Command ingestion: non-RT producers to the RT cycle.

pub mod mailbox;

pub use mailbox::{CommandMailbox, CommandSender, MAX_READ_RETRIES, ReadOutcome};
