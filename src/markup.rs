//! Inline emphasis for chat bubbles: `**strong**` and `*emphasis*`, nothing
//! else. Bold spans are resolved first, then italic spans over the plain text
//! that remains. Delimiters that do not pair up stay literal.

use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Strong(String),
    Emphasis(String),
}

pub fn tokenize(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    for span in split_strong(text) {
        match span {
            Span::Text(plain) => split_emphasis(&plain, &mut spans),
            other => spans.push(other),
        }
    }
    spans
}

fn push_text(spans: &mut Vec<Span>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Span::Text(last)) = spans.last_mut() {
        last.push_str(text);
    } else {
        spans.push(Span::Text(text.to_string()));
    }
}

fn split_strong(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        match strong_close(&rest[open + 2..]) {
            Some(close) => {
                let inner = &rest[open + 2..];
                push_text(&mut spans, &rest[..open]);
                spans.push(Span::Strong(inner[..close].to_string()));
                rest = &inner[close + 2..];
            }
            None => {
                push_text(&mut spans, &rest[..open + 1]);
                rest = &rest[open + 1..];
            }
        }
    }

    push_text(&mut spans, rest);
    spans
}

/// Offset of the closing `**` within `inner`. Strong spans never cross a
/// line break and hold at least one character.
fn strong_close(inner: &str) -> Option<usize> {
    let line = &inner[..inner.find('\n').unwrap_or(inner.len())];
    let first_len = line.chars().next()?.len_utf8();
    line[first_len..].find("**").map(|pos| first_len + pos)
}

fn split_emphasis(text: &str, spans: &mut Vec<Span>) {
    let stars: Vec<usize> = text.match_indices('*').map(|(i, _)| i).collect();
    let mut emitted = 0;
    let mut idx = 0;

    while idx < stars.len() {
        let open = stars[idx];
        let Some(close) = stars.get(idx + 1).copied() else {
            break;
        };
        if open < emitted || !opens_emphasis(text, open) || !closes_emphasis(text, open, close) {
            idx += 1;
            continue;
        }
        push_text(spans, &text[emitted..open]);
        spans.push(Span::Emphasis(text[open + 1..close].to_string()));
        emitted = close + 1;
        idx += 2;
    }

    push_text(spans, &text[emitted..]);
}

fn opens_emphasis(text: &str, open: usize) -> bool {
    let before = text[..open].chars().next_back();
    let after = text[open + 1..].chars().next();
    before != Some('*') && matches!(after, Some(c) if c != '*' && !c.is_whitespace())
}

fn closes_emphasis(text: &str, open: usize, close: usize) -> bool {
    let last = text[open + 1..close].chars().next_back();
    let after = text[close + 1..].chars().next();
    matches!(last, Some(c) if !c.is_whitespace()) && after != Some('*')
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

pub fn to_html(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(t) => escape_html(t, &mut out),
            Span::Strong(t) => {
                out.push_str("<strong>");
                escape_html(t, &mut out);
                out.push_str("</strong>");
            }
            Span::Emphasis(t) => {
                out.push_str("<em>");
                escape_html(t, &mut out);
                out.push_str("</em>");
            }
        }
    }
    out
}

pub fn to_terminal(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Text(t) => t.normal().to_string(),
            Span::Strong(t) => t.bold().to_string(),
            Span::Emphasis(t) => t.italic().to_string(),
        })
        .collect()
}
