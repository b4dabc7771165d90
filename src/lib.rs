pub mod config;
pub mod error;
pub mod subscriber;

pub mod postgres;
pub mod test_decoding;

pub use config::Config;
pub use error::{Error, Result};
pub use subscriber::{subscribe, Subscriber, SubscriberStats};
pub use test_decoding::{parse, Message, ParseFailure};
