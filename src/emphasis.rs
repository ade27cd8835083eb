//! `**…**` emphasis spans, shared by every renderer.
//!
//! Markers are only interpreted at render time; the stored strings keep them.
//! An unmatched `**` (or an empty `****` pair) is literal text.

use serde::Serialize;

const MARKER: &str = "**";

/// One run of text with its emphasis flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span<'a> {
    pub text: &'a str,
    pub strong: bool,
}

/// Split `s` into plain and strong spans. Never fails.
pub fn tokenize(s: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(open) = s[cursor..].find(MARKER).map(|i| cursor + i) {
        let inner_start = open + MARKER.len();
        let Some(close) = s[inner_start..].find(MARKER).map(|i| inner_start + i) else {
            break;
        };
        if close == inner_start {
            // "****" carries no text; keep it literal and move past it
            cursor = close + MARKER.len();
            continue;
        }
        push_plain(&mut spans, &s[plain_start..open]);
        spans.push(Span {
            text: &s[inner_start..close],
            strong: true,
        });
        cursor = close + MARKER.len();
        plain_start = cursor;
    }

    push_plain(&mut spans, &s[plain_start..]);
    spans
}

fn push_plain<'a>(spans: &mut Vec<Span<'a>>, text: &'a str) {
    if text.is_empty() {
        return;
    }
    spans.push(Span {
        text,
        strong: false,
    });
}

/// Text with paired markers removed; stray markers survive.
pub fn strip(s: &str) -> String {
    tokenize(s).into_iter().map(|span| span.text).collect()
}

/// Whether `s` has at least one well-formed span.
pub fn has_emphasis(s: &str) -> bool {
    tokenize(s).iter().any(|span| span.strong)
}
