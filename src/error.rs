//! Error types and result handling for pg-realtime.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used by the subscription side of the crate. The
//! decoder itself only ever fails with [`ParseFailure`], which converts into
//! [`Error::Parse`].
//!
//! # Example
//!
//! ```rust
//! use pg_realtime::{test_decoding, Error, Result};
//!
//! fn decode(line: &str) -> Result<test_decoding::Message> {
//!     Ok(test_decoding::parse(line)?)
//! }
//!
//! match decode("TRUNCATE 1") {
//!     Ok(msg) => println!("decoded {}", msg.command()),
//!     Err(Error::Parse(failure)) => eprintln!("bad line: {}", failure.line),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use thiserror::Error;

use crate::test_decoding::ParseFailure;

/// The main error type for pg-realtime operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A change record was not valid test_decoding output.
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// Configuration error, typically from an invalid file or environment
    /// variable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// PostgreSQL client error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// JSON serialization error when encoding records.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Replication slot or change-fetching error.
    #[error("Replication error: {message}")]
    Replication {
        /// Description of the replication error
        message: String,
    },

    /// The consumer of decoded records went away.
    #[error("Record channel closed")]
    ChannelClosed,
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// A convenient Result type alias for pg-realtime operations.
pub type Result<T> = std::result::Result<T, Error>;
