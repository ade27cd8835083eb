//! Raw fallback model — the source lines with line-local labels only.
//!
//! Used when the confidence gate rejects the structured model. No role
//! decomposition happens here, so every non-blank line survives verbatim.

use serde::Serialize;

use crate::classify::{strip_bullet, LineClassifier};
use crate::segment::is_name_candidate;

/// Lines searched for the name, counted over non-blank lines.
const NAME_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawKind {
    Blank,
    Name,
    Contact,
    Header,
    Bullet,
    Date,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLine {
    pub kind: RawKind,
    /// Trimmed text; bullet lines without their glyph
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawDocument {
    pub lines: Vec<RawLine>,
}

impl RawDocument {
    pub fn list_unit_count(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == RawKind::Bullet).count()
    }

    /// Lines with content, blank separators skipped.
    pub fn content(&self) -> impl Iterator<Item = &RawLine> {
        self.lines.iter().filter(|l| l.kind != RawKind::Blank)
    }
}

impl LineClassifier {
    /// Label each line on its own, without section or role context.
    pub fn classify_raw<S: AsRef<str>>(&self, lines: &[S]) -> RawDocument {
        let mut out = Vec::with_capacity(lines.len());
        let mut seen = 0usize;
        let mut name_found = false;
        let mut header_seen = false;

        for line in lines.iter().map(|l| l.as_ref().trim()) {
            if line.is_empty() {
                out.push(RawLine {
                    kind: RawKind::Blank,
                    text: String::new(),
                });
                continue;
            }
            seen += 1;

            let kind = if self.is_bullet(line) && !strip_bullet(line).is_empty() {
                RawKind::Bullet
            } else if self.is_contact(line) {
                RawKind::Contact
            } else if !name_found
                && !header_seen
                && seen <= NAME_WINDOW
                && is_name_candidate(self, line)
            {
                name_found = true;
                RawKind::Name
            } else if self.section_header(line).is_some() {
                header_seen = true;
                RawKind::Header
            } else if self.has_date(line) && self.metadata(line).is_some() {
                RawKind::Date
            } else {
                RawKind::Text
            };

            let text = match kind {
                RawKind::Bullet => strip_bullet(line),
                _ => line,
            };
            out.push(RawLine {
                kind,
                text: text.to_string(),
            });
        }

        RawDocument { lines: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lines: &[&str]) -> Vec<RawKind> {
        LineClassifier::default()
            .classify_raw(lines)
            .lines
            .iter()
            .map(|l| l.kind)
            .collect()
    }

    #[test]
    fn line_local_labels() {
        assert_eq!(
            kinds(&[
                "Jane Doe",
                "jane@x.com | 555-123-4567",
                "",
                "EXPERIENCE",
                "Did many things at several places",
                "• Shipped X",
                "Acme Corp 2019 - 2021",
            ]),
            vec![
                RawKind::Name,
                RawKind::Contact,
                RawKind::Blank,
                RawKind::Header,
                RawKind::Text,
                RawKind::Bullet,
                RawKind::Date,
            ]
        );
    }

    #[test]
    fn every_line_survives() {
        let lines = ["  Jane Doe ", "•", "random **bold** text", "- item"];
        let raw = LineClassifier::default().classify_raw(&lines);
        let texts: Vec<_> = raw.content().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Jane Doe", "•", "random **bold** text", "item"]);
        assert_eq!(raw.list_unit_count(), 1);
    }
}
