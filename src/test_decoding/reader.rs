//! Cursor-style token reading over a preprocessed line.
//!
//! Every function takes the unread tail of the line and hands back what it
//! consumed together with the new tail, so callers thread a single `&str`
//! through successive reads without copying.

use thiserror::Error;

/// The bare token test_decoding prints for SQL `NULL`.
pub const NULL_TOKEN: &str = "null";

/// A column group could not be read.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0}")]
pub struct Malformed(pub &'static str);

/// One column as it appears on the wire, before placeholders are restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawColumn<'a> {
    pub name: &'a str,
    pub data_type: &'a str,
    pub value: Option<&'a str>,
}

/// Splits `text` at the first `delimiter`.
///
/// Without a delimiter the whole text is matched and the remainder is empty.
pub fn read_until<'a>(text: &'a str, delimiter: &str) -> (&'a str, &'a str) {
    text.split_once(delimiter).unwrap_or((text, ""))
}

/// Reads one token: a `[type]` annotation, a quoted run, or a bare word.
///
/// Returns `None` for the bare `null` token. Exhausted input yields
/// `Some("")`.
pub fn read(text: &str) -> (Option<&str>, &str) {
    if let Some(rest) = text.strip_prefix('[') {
        let (token, rest) = read_until(rest, "]");
        return (Some(token), rest);
    }

    for quote in ["'", "\""] {
        if let Some(rest) = text.strip_prefix(quote) {
            let (token, rest) = read_until(rest, quote);
            return (Some(token), rest);
        }
    }

    let end = text
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '[' || c == ' ')
        .map_or(text.len(), |(i, _)| i);
    let (token, rest) = text.split_at(end);

    if token == NULL_TOKEN {
        (None, rest)
    } else {
        (Some(token), rest)
    }
}

/// Reads one `name[type]:value` group.
///
/// Returns `None` once the input is exhausted. The returned tail has its
/// separating spaces removed.
pub fn read_column(text: &str) -> Result<(Option<RawColumn<'_>>, &str), Malformed> {
    if text.is_empty() {
        return Ok((None, text));
    }

    ensure_closed(text)?;
    let (name, rest) = match read(text) {
        (Some(""), _) => return Err(Malformed("empty column name")),
        (Some(name), rest) if rest.starts_with('[') => (name, rest),
        (Some(_), _) => return Err(Malformed("column name without a type annotation")),
        (None, _) => return Err(Malformed("column name is the null token")),
    };

    ensure_closed(rest)?;
    let (data_type, rest) = read(rest);
    let rest = rest
        .strip_prefix(':')
        .ok_or(Malformed("type annotation without a value separator"))?;

    if rest.is_empty() || rest.starts_with(' ') {
        return Err(Malformed("missing column value"));
    }
    ensure_closed(rest)?;
    let (value, rest) = read(rest);
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return Err(Malformed("trailing characters after column value"));
    }

    let column = RawColumn {
        name,
        data_type: data_type.unwrap_or_default(),
        value,
    };
    Ok((Some(column), rest.trim_start_matches(' ')))
}

/// Fails when `text` opens a bracket or quoted run that never closes.
pub(crate) fn ensure_closed(text: &str) -> Result<(), Malformed> {
    let closer = match text.chars().next() {
        Some('[') => ']',
        Some('\'') => '\'',
        Some('"') => '"',
        _ => return Ok(()),
    };

    if text[1..].contains(closer) {
        Ok(())
    } else {
        Err(Malformed("unterminated bracket or quoted run"))
    }
}
