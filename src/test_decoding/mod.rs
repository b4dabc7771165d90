//! Decoder for the text output of PostgreSQL's `test_decoding` plugin.

pub mod escape;
pub mod message;
pub mod parser;
pub mod reader;

#[cfg(test)]
mod parser_tests;

pub use message::{
    Column, CrudCommand, CrudMessage, Message, TransactionCommand, TransactionMessage,
    UnknownCommand,
};
pub use parser::{parse, ParseFailure};
