use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::trace;

use super::escape::{postprocess, preprocess};
use super::message::{Column, CrudCommand, CrudMessage, Message, TransactionCommand, TransactionMessage};
use super::reader::{ensure_closed, read, read_column, read_until, Malformed, RawColumn};

static TRANSACTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(BEGIN|COMMIT) ([0-9]+)$").unwrap());

/// Printed instead of a column list when a tuple is absent.
const NO_TUPLE_DATA: &str = "(no-tuple-data)";
const OLD_KEY: &str = "old-key: ";
const NEW_TUPLE: &str = "new-tuple: ";

/// A line that is not valid test_decoding output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse message ({reason}): {line}")]
pub struct ParseFailure {
    /// The offending line, verbatim.
    pub line: String,
    pub reason: &'static str,
}

impl ParseFailure {
    fn new(line: &str, reason: &'static str) -> Self {
        Self {
            line: line.to_string(),
            reason,
        }
    }
}

/// Decodes one line of `test_decoding` output.
///
/// A line either decodes completely or fails; no partially filled message is
/// ever returned.
pub fn parse(line: &str) -> Result<Message, ParseFailure> {
    let message = match line.as_bytes().first() {
        Some(b'B') | Some(b'C') => parse_transaction(line).map(Message::Transaction),
        Some(b't') => parse_crud(line).map(Message::Crud),
        _ => Err(ParseFailure::new(line, "unrecognized leading character")),
    }?;

    trace!(command = message.command(), "decoded test_decoding line");
    Ok(message)
}

fn parse_transaction(line: &str) -> Result<TransactionMessage, ParseFailure> {
    let captures = TRANSACTION_PATTERN
        .captures(line)
        .ok_or_else(|| ParseFailure::new(line, "not a BEGIN or COMMIT record"))?;

    let command = captures[1]
        .parse::<TransactionCommand>()
        .map_err(|_| ParseFailure::new(line, "not a BEGIN or COMMIT record"))?;
    let lsn = captures[2]
        .parse::<u64>()
        .map_err(|_| ParseFailure::new(line, "lsn does not fit in 64 bits"))?;

    Ok(TransactionMessage { command, lsn })
}

fn parse_crud(line: &str) -> Result<CrudMessage, ParseFailure> {
    let escaped =
        preprocess(line).ok_or_else(|| ParseFailure::new(line, "line contains a NUL character"))?;

    let (keyword, rest) = read_until(&escaped, " ");
    if keyword != "table" {
        return Err(ParseFailure::new(line, "expected the table keyword"));
    }

    let (qualified_name, rest) = rest
        .split_once(": ")
        .ok_or_else(|| ParseFailure::new(line, "missing ': ' after the table name"))?;
    let (schema, table) =
        split_qualified_name(qualified_name).map_err(|e| ParseFailure::new(line, e.0))?;

    // A row without columns ends the line right after the command.
    let (command, rest) = match rest.split_once(": ") {
        Some(split) => split,
        None => rest
            .strip_suffix(':')
            .map(|command| (command, ""))
            .ok_or_else(|| ParseFailure::new(line, "missing ': ' after the command"))?,
    };
    let command = postprocess(command)
        .parse::<CrudCommand>()
        .map_err(|_| ParseFailure::new(line, "unsupported command"))?;

    let (old_key, columns) = read_tuples(rest).map_err(|e| ParseFailure::new(line, e.0))?;

    Ok(CrudMessage {
        command,
        schema: schema.map(postprocess),
        table: postprocess(table),
        columns,
        old_key,
    })
}

/// Splits `schema.table` at the first dot outside a quoted identifier.
fn split_qualified_name(name: &str) -> Result<(Option<&str>, &str), Malformed> {
    let mut quote = None;
    let dot = name
        .char_indices()
        .find(|&(_, c)| match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                false
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                false
            }
            None => c == '.',
        })
        .map(|(i, _)| i);

    match dot {
        Some(i) => Ok((Some(read_identifier(&name[..i])?), read_identifier(&name[i + 1..])?)),
        None => Ok((None, read_identifier(name)?)),
    }
}

/// Reads an identifier that must span all of `text`.
fn read_identifier(text: &str) -> Result<&str, Malformed> {
    ensure_closed(text)?;
    match read(text) {
        (Some(ident), "") if !ident.is_empty() => Ok(ident),
        _ => Err(Malformed("malformed table identifier")),
    }
}

/// Reads the tuple part of a row change into `(old_key, columns)`.
fn read_tuples(text: &str) -> Result<(Vec<Column>, Vec<Column>), Malformed> {
    let Some(old) = text.strip_prefix(OLD_KEY) else {
        let (columns, _) = read_tuple(text, None)?;
        return Ok((Vec::new(), columns));
    };

    let (old_key, rest) = read_tuple(old, Some(NEW_TUPLE))?;
    let new = rest
        .strip_prefix(NEW_TUPLE)
        .ok_or(Malformed("old-key section without new-tuple"))?;
    let (columns, _) = read_tuple(new, None)?;

    Ok((old_key, columns))
}

/// Collects columns until the input ends or `stop` is reached.
fn read_tuple<'a>(text: &'a str, stop: Option<&str>) -> Result<(Vec<Column>, &'a str), Malformed> {
    if let Some(rest) = text.strip_prefix(NO_TUPLE_DATA) {
        return Ok((Vec::new(), rest.trim_start_matches(' ')));
    }

    let mut columns = Vec::new();
    let mut rest = text.trim_start_matches(' ');
    loop {
        if stop.is_some_and(|marker| rest.starts_with(marker)) {
            break;
        }
        match read_column(rest)? {
            (Some(raw), tail) => {
                columns.push(restore(raw));
                rest = tail;
            }
            (None, tail) => {
                rest = tail;
                break;
            }
        }
    }

    Ok((columns, rest))
}

fn restore(raw: RawColumn<'_>) -> Column {
    Column {
        column: postprocess(raw.name),
        data_type: postprocess(raw.data_type),
        value: raw.value.map(postprocess),
    }
}
