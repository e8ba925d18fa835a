//! Command handling module.
//!
//! Decides whether an inbound message invokes a registered command for the
//! receiving account, splits its arguments and routes it to a handler.

mod filter;
mod handler;
mod tokenizer;
mod types;

pub use filter::CommandFilter;
pub use handler::{BuiltinCommand, CommandRouter, HandlerFn};
pub use tokenizer::tokenize;
pub use types::{CommandRecord, CommandResult, FilterOutcome, IncomingMessage};
