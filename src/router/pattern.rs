//! Translation of PCRE-style delimited patterns (`/^\/a\/(\d+)$/i`) into
//! patterns the `regex` crate accepts.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("no ending delimiter `{0}` found")]
    MissingDelimiter(char),
    #[error("unknown pattern modifier `{0}`")]
    UnknownModifier(char),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

fn closing_delimiter(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '{' => Some('}'),
        '[' => Some(']'),
        '<' => Some('>'),
        c if c.is_alphanumeric() || c == '\\' || c.is_whitespace() => None,
        c => Some(c),
    }
}

/// Split `pattern` into body and modifiers.
///
/// `Ok(None)` means the first character cannot open a delimited pattern.
fn split_delimited(pattern: &str) -> Result<Option<(&str, &str)>, PatternError> {
    let Some(open) = pattern.chars().next() else {
        return Ok(None);
    };
    let Some(close) = closing_delimiter(open) else {
        return Ok(None);
    };
    let rest = &pattern[open.len_utf8()..];
    let end = rest
        .rfind(close)
        .ok_or(PatternError::MissingDelimiter(close))?;
    Ok(Some((&rest[..end], &rest[end + close.len_utf8()..])))
}

/// Convert a delimited pattern into `regex` syntax.
///
/// Supported modifiers: `i`, `m`, `s`, `x`, `U` (mapped to inline flags),
/// `A` (anchors at the start of the subject), `u` and `D` (accepted, no effect).
/// A pattern whose first character cannot be a delimiter (alphanumeric or
/// backslash) is returned unchanged. One that opens with a delimiter but never
/// closes it is an error.
pub fn translate(pattern: &str) -> Result<String, PatternError> {
    let trimmed = pattern.trim_start();
    let Some((body, modifiers)) = split_delimited(trimmed)? else {
        return Ok(pattern.to_string());
    };

    let mut flags = String::new();
    let mut anchored = false;
    for m in modifiers.trim_end_matches('\n').chars() {
        match m {
            'i' | 'm' | 's' | 'x' | 'U' => {
                if !flags.contains(m) {
                    flags.push(m);
                }
            }
            'A' => anchored = true,
            'u' | 'D' => {}
            other => return Err(PatternError::UnknownModifier(other)),
        }
    }

    let mut out = String::with_capacity(body.len() + flags.len() + 8);
    if !flags.is_empty() {
        out.push_str("(?");
        out.push_str(&flags);
        out.push(')');
    }
    if anchored {
        out.push_str(r"\A(?:");
        out.push_str(body);
        out.push(')');
    } else {
        out.push_str(body);
    }
    Ok(out)
}

/// Translate and compile in one step.
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    Ok(Regex::new(&translate(pattern)?)?)
}
