//! Matching of literal translation-lookup calls in source text.
//!
//! A match is a configured call name at a word boundary, followed by `(` and
//! a single- or double-quoted string literal. Anything else (concatenation,
//! interpolation, a variable argument) is deliberately not matched: the
//! scanner only ever claims "found by literal scan", never completeness.

use std::collections::BTreeSet;

/// Adds every key passed literally to `name(...)` in `content` to `out`.
pub(crate) fn extract_literal_keys(content: &str, name: &str, out: &mut BTreeSet<String>) {
    for (index, _) in content.match_indices(name) {
        if !at_word_boundary(content, index) {
            continue;
        }
        let rest = &content[index + name.len()..];
        if let Some(key) = quoted_call_argument(rest)
            && !key.is_empty()
        {
            out.insert(key);
        }
    }
}

/// The character before the match must not be part of a longer identifier,
/// so `trans(` matches but `strans(` does not. Member access (`.t(`,
/// `->t(`) still counts as a call of the configured name.
fn at_word_boundary(content: &str, index: usize) -> bool {
    content[..index]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric() && c != '_' && c != '$' && c != '@')
}

/// Parses `("...")` or `('...')` directly after a call name, returning the
/// unescaped literal. `None` for computed arguments, unterminated quotes, or
/// a literal that is only part of a larger expression (`'auth.' . $x`).
fn quoted_call_argument(rest: &str) -> Option<String> {
    let rest = rest.trim_start().strip_prefix('(')?;
    let mut chars = rest.trim_start().chars();

    let quote = chars.next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }

    let mut key = String::new();
    let mut escaped = false;
    while let Some(c) = chars.next() {
        if escaped {
            // Quote and backslash escapes unescape; anything else is kept
            // verbatim, backslash included.
            if !matches!(c, '\\' | '\'' | '"') {
                key.push('\\');
            }
            key.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            // The literal must be the whole argument; a trailing operator
            // means the key is computed and only partially literal.
            return match chars.as_str().trim_start().chars().next() {
                Some(')' | ',') => Some(key),
                _ => None,
            };
        } else {
            key.push(c);
        }
    }

    None
}
