pub mod connection;
pub mod slot;
pub mod source;
pub mod types;

pub use connection::PgConnection;
pub use slot::ReplicationSlot;
pub use source::{ChangeSource, PgChangeSource};
pub use types::{ChangeRecord, RawChange};
