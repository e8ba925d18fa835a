//! Quote-aware argument splitting.

/// Splits argument text into tokens.
///
/// A token is either a run quoted with `"` or `'`, closed by the first
/// matching quote not preceded by a backslash and never crossing a line
/// break, or a maximal run of non-whitespace characters. Quoted runs only
/// start where a token starts. `\"` and `\'` are unescaped in every token.
#[must_use]
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        let Some(first) = rest.chars().next() else {
            break;
        };

        if (first == '"' || first == '\'')
            && let Some(close) = closing_quote(rest, first)
        {
            tokens.push(unescape(&rest[1..close]));
            rest = &rest[close + 1..];
            continue;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        tokens.push(unescape(&rest[..end]));
        rest = &rest[end..];
    }

    tokens
}

/// Finds the byte offset of the quote closing the run that opens `text`.
fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut prev = quote;

    for (i, ch) in text[1..].char_indices() {
        if ch == '\n' {
            return None;
        }
        if ch == quote && prev != '\\' {
            return Some(i + 1);
        }
        prev = ch;
    }

    None
}

fn unescape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && (next == '"' || next == '\'')
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(ch);
    }

    out
}
