//! Script string quoting.
//!
//! `quote` picks the lightest literal form that reads back to the same
//! string: a bareword when every character is safe, a single-quoted string
//! for printable text, and a double-quoted string with escapes when the
//! text carries control characters.

/// Punctuation allowed in a bareword besides letters and digits.
const BAREWORD_PUNCT: &str = "!%+,-./:@_";

/// Returns true if `c` may appear in a bareword.
pub fn is_bareword_char(c: char) -> bool {
    c.is_alphanumeric() || BAREWORD_PUNCT.contains(c)
}

/// Quote a string so the literal reader yields it back unchanged.
pub fn quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }

    let mut bare = true;
    for c in s.chars() {
        if c.is_control() || c == char::REPLACEMENT_CHARACTER {
            return quote_double(s);
        }
        if !is_bareword_char(c) {
            bare = false;
        }
    }

    if bare && !s.starts_with('~') {
        s.to_string()
    } else {
        quote_single(s)
    }
}

fn quote_single(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

fn quote_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x1b' => out.push_str("\\e"),
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Strip the quotes from a single-quoted literal and undouble `''`.
///
/// Returns `None` if `lit` is not a well-formed single-quoted string.
pub fn unquote_single(lit: &str) -> Option<String> {
    let body = lit.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // Only a doubled quote may appear inside the body.
            if chars.next() != Some('\'') {
                return None;
            }
        }
        out.push(c);
    }
    Some(out)
}

/// Strip the quotes from a double-quoted literal and process escapes.
///
/// Returns `None` on a malformed literal or an unknown escape.
pub fn unquote_double(lit: &str) -> Option<String> {
    let body = lit.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'e' => out.push('\x1b'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let hex: String = chars.by_ref().take_while(|&c| c != '}').collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}
