use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A keyword that is not one of the commands test_decoding emits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionCommand {
    Begin,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrudCommand {
    Insert,
    Update,
    Delete,
}

impl TransactionCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCommand::Begin => "BEGIN",
            TransactionCommand::Commit => "COMMIT",
        }
    }
}

impl CrudCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudCommand::Insert => "INSERT",
            CrudCommand::Update => "UPDATE",
            CrudCommand::Delete => "DELETE",
        }
    }
}

impl fmt::Display for TransactionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CrudCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BEGIN" => Ok(TransactionCommand::Begin),
            "COMMIT" => Ok(TransactionCommand::Commit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

impl FromStr for CrudCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(CrudCommand::Insert),
            "UPDATE" => Ok(CrudCommand::Update),
            "DELETE" => Ok(CrudCommand::Delete),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// The start or end of a transaction.
///
/// ```text
/// BEGIN 601
/// COMMIT 601
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMessage {
    pub command: TransactionCommand,
    pub lsn: u64,
}

/// One column of a changed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub column: String,
    /// Type text exactly as printed, e.g. `integer[]`.
    pub data_type: String,
    /// `None` is SQL `NULL`.
    pub value: Option<String>,
}

impl Column {
    pub fn new(column: impl Into<String>, data_type: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            column: column.into(),
            data_type: data_type.into(),
            value: value.map(str::to_string),
        }
    }
}

/// An insert, update or delete of a single row.
///
/// ```text
/// table public.account: INSERT: id[integer]:5 email[text]:'example@example.com' is_email_verified[boolean]:false
/// table public.account: UPDATE: id[integer]:5 email[text]:'example@example.com' is_email_verified[boolean]:true
/// table public.account: DELETE: id[integer]:5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudMessage {
    pub command: CrudCommand,
    /// `None` for an unqualified table name.
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<Column>,
    /// Previous key values, only present on updates that printed an
    /// `old-key:` section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub old_key: Vec<Column>,
}

impl CrudMessage {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// `schema.table`, or just `table` when unqualified.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

/// One decoded line of test_decoding output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Transaction(TransactionMessage),
    Crud(CrudMessage),
}

impl Message {
    pub fn command(&self) -> &'static str {
        match self {
            Message::Transaction(msg) => msg.command.as_str(),
            Message::Crud(msg) => msg.command.as_str(),
        }
    }
}

impl From<TransactionMessage> for Message {
    fn from(msg: TransactionMessage) -> Self {
        Message::Transaction(msg)
    }
}

impl From<CrudMessage> for Message {
    fn from(msg: CrudMessage) -> Self {
        Message::Crud(msg)
    }
}
