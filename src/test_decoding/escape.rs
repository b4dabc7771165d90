//! Placeholder substitution for the two-character sequences that would
//! otherwise confuse the token reader.
//!
//! An empty bracket pair `[]` (array types such as `integer[]`) and a doubled
//! quote inside a quoted run (`'it''s'`, `"My ""Table"""`) are swapped for
//! NUL-led placeholders before tokenizing. PostgreSQL text can never hold a
//! NUL character and [`preprocess`] refuses lines that contain one, so a
//! placeholder can never collide with real input.

/// Stands in for `[]`.
pub const BRACKET_PLACEHOLDER: &str = "\u{0}\u{1}";
/// Stands in for `''` inside a single-quoted run.
pub const SINGLE_QUOTE_PLACEHOLDER: &str = "\u{0}\u{2}";
/// Stands in for `""` inside a double-quoted identifier.
pub const DOUBLE_QUOTE_PLACEHOLDER: &str = "\u{0}\u{3}";

const RESERVED: char = '\u{0}';

#[derive(Clone, Copy, PartialEq, Eq)]
enum Run {
    Bare,
    Single,
    Double,
}

/// Replaces `[]` and escaped doubled quotes with placeholders.
///
/// Returns `None` if the line already contains the reserved NUL character.
/// A doubled quote is only an escape inside a quoted run; outside one, `''`
/// is an empty literal and is left alone.
pub fn preprocess(raw: &str) -> Option<String> {
    if raw.contains(RESERVED) {
        return None;
    }

    let mut escaped = String::with_capacity(raw.len());
    let mut run = Run::Bare;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match (run, c) {
            (_, '[') if chars.peek() == Some(&']') => {
                chars.next();
                escaped.push_str(BRACKET_PLACEHOLDER);
            }
            (Run::Bare, '\'') => {
                run = Run::Single;
                escaped.push(c);
            }
            (Run::Bare, '"') => {
                run = Run::Double;
                escaped.push(c);
            }
            (Run::Single, '\'') | (Run::Double, '"') => {
                if chars.peek() == Some(&c) {
                    chars.next();
                    escaped.push_str(if c == '\'' {
                        SINGLE_QUOTE_PLACEHOLDER
                    } else {
                        DOUBLE_QUOTE_PLACEHOLDER
                    });
                } else {
                    run = Run::Bare;
                    escaped.push(c);
                }
            }
            _ => escaped.push(c),
        }
    }

    Some(escaped)
}

/// Restores the placeholders in one extracted token.
///
/// `[]` comes back verbatim; escaped quotes come back as the single quote
/// character they encode.
pub fn postprocess(fragment: &str) -> String {
    if !fragment.contains(RESERVED) {
        return fragment.to_string();
    }

    fragment
        .replace(BRACKET_PLACEHOLDER, "[]")
        .replace(SINGLE_QUOTE_PLACEHOLDER, "'")
        .replace(DOUBLE_QUOTE_PLACEHOLDER, "\"")
}
