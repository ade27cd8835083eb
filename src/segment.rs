//! Section segmentation — one left-to-right scan over the whole document.
//!
//! Lines before the first header form the implicit HEADER section. A
//! document without any header collapses into a single `Other` section.

use tracing::debug;

use crate::classify::LineClassifier;
use crate::emphasis;
use crate::model::SectionKind;

/// How many non-blank header lines are searched for the name and headline.
const HEADER_WINDOW: usize = 6;
/// Names longer than this read as a sentence.
const MAX_NAME_WORDS: usize = 6;

/// A section before its body is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection<'a> {
    pub kind: SectionKind,
    /// Header line as written, trimmed (empty for the implicit header block)
    pub title: String,
    /// Body lines, untrimmed, blank lines included
    pub lines: Vec<&'a str>,
}

impl<'a> RawSection<'a> {
    fn new(kind: SectionKind, title: impl Into<String>) -> Self {
        RawSection {
            kind,
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn has_content(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }
}

/// Identity fields recovered from the header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub name: String,
    pub headline: Option<String>,
    pub contact: Vec<String>,
    /// Header lines none of the above claimed
    pub leftover: Vec<String>,
}

/// Split `lines` into ordered sections.
pub fn segment<'a, S: AsRef<str>>(
    classifier: &LineClassifier,
    lines: &'a [S],
) -> Vec<RawSection<'a>> {
    let mut sections: Vec<RawSection<'a>> = Vec::new();
    let mut current = RawSection::new(SectionKind::Header, "");
    let mut headers_found = 0usize;
    let mut name_seen = false;
    let mut previous: Option<&str> = None;

    for line in lines.iter().map(AsRef::as_ref) {
        let trimmed = line.trim();
        let in_header_block = headers_found == 0;

        if let Some(kind) = classifier.section_header(trimmed) {
            // An ALL-CAPS name is not a catch-all section
            let caps_name = kind == SectionKind::Other
                && in_header_block
                && !name_seen
                && classifier.header_synonym(trimmed).is_none()
                && is_name_candidate(classifier, trimmed);
            // Nor is an ALL-CAPS company right under a role title
            let caps_company = kind == SectionKind::Other
                && current.kind == SectionKind::Experience
                && classifier.header_synonym(trimmed).is_none()
                && previous.is_some_and(|p| classifier.is_role_title(p));
            if !caps_name && !caps_company {
                debug!(kind = kind.as_str(), title = trimmed, "section header");
                headers_found += 1;
                let finished = std::mem::replace(&mut current, RawSection::new(kind, trimmed));
                if finished.kind != SectionKind::Header || finished.has_content() {
                    sections.push(finished);
                }
                previous = None;
                continue;
            }
        }

        if in_header_block && !trimmed.is_empty() && !classifier.is_contact(trimmed) {
            name_seen = true;
        }
        if !trimmed.is_empty() {
            previous = Some(trimmed);
        }
        current.lines.push(line);
    }

    if headers_found == 0 {
        debug!("no section headers found; treating the document as one section");
        return vec![RawSection {
            kind: SectionKind::Other,
            title: String::new(),
            lines: lines.iter().map(AsRef::as_ref).collect(),
        }];
    }

    sections.push(current);
    sections
}

/// Recover name, headline and contact items from header-block lines.
pub fn parse_header(classifier: &LineClassifier, lines: &[&str]) -> HeaderFields {
    let mut fields = HeaderFields::default();
    let mut position = 0usize;

    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        position += 1;
        let in_window = position <= HEADER_WINDOW;

        if classifier.is_contact(line) {
            for item in classifier.split_contact(line) {
                push_unique(&mut fields.contact, item);
            }
            continue;
        }
        if fields.name.is_empty() && in_window && is_name_candidate(classifier, line) {
            fields.name = line.to_string();
            continue;
        }
        if fields.headline.is_none() && in_window && classifier.is_role_title(line) {
            fields.headline = Some(line.to_string());
            continue;
        }
        if in_window && classifier.is_location(&emphasis::strip(line)) {
            push_unique(&mut fields.contact, line.to_string());
            continue;
        }
        fields.leftover.push(line.to_string());
    }

    fields
}

/// Whether a header-block line can be the person's name.
pub fn is_name_candidate(classifier: &LineClassifier, line: &str) -> bool {
    let plain = emphasis::strip(line.trim());
    let plain = plain.trim();
    let words = plain.split_whitespace().count();
    words > 0
        && words <= MAX_NAME_WORDS
        && plain.chars().any(char::is_alphabetic)
        && !plain.chars().any(|c| c.is_ascii_digit())
        && !plain.ends_with(['.', ':'])
        && !classifier.is_bullet(plain)
        && !classifier.is_contact(plain)
        && classifier.header_synonym(plain).is_none()
}

/// Order-preserving, case-insensitive dedup.
fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.iter().any(|i| i.eq_ignore_ascii_case(&item)) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_headers() {
        let c = LineClassifier::default();
        let lines = [
            "Jane Doe",
            "jane@x.com",
            "SUMMARY",
            "Builds things.",
            "EXPERIENCE",
            "Senior PM",
            "• Did Y",
        ];
        let sections = segment(&c, &lines);
        let kinds: Vec<_> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Header, SectionKind::Summary, SectionKind::Experience]
        );
        assert_eq!(sections[0].lines, vec!["Jane Doe", "jane@x.com"]);
        assert_eq!(sections[1].title, "SUMMARY");
        assert_eq!(sections[1].lines, vec!["Builds things."]);
        assert_eq!(sections[2].lines, vec!["Senior PM", "• Did Y"]);
    }

    #[test]
    fn no_headers_yields_single_other_section() {
        let c = LineClassifier::default();
        let lines = ["just some text", "", "more text"];
        let sections = segment(&c, &lines);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Other);
        assert_eq!(sections[0].lines.len(), 3);
    }

    #[test]
    fn all_caps_name_is_not_a_header() {
        let c = LineClassifier::default();
        let lines = ["JANE DOE", "jane@x.com", "SKILLS", "Rust, Go"];
        let sections = segment(&c, &lines);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines[0], "JANE DOE");
        assert_eq!(sections[1].kind, SectionKind::Skills);
    }

    #[test]
    fn all_caps_company_under_a_title_stays_in_experience() {
        let c = LineClassifier::default();
        let lines = [
            "Jane Doe",
            "EXPERIENCE",
            "Senior Product Manager",
            "GLOBEX",
            "Jan 2020 – Present",
            "• Shipped X",
            "SKILLS",
            "Rust",
        ];
        let sections = segment(&c, &lines);
        let kinds: Vec<_> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Header, SectionKind::Experience, SectionKind::Skills]
        );
        assert_eq!(sections[1].lines[1], "GLOBEX");
    }

    #[test]
    fn empty_header_block_is_dropped() {
        let c = LineClassifier::default();
        let lines = ["", "EXPERIENCE", "Senior PM"];
        let sections = segment(&c, &lines);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Experience);
    }

    #[test]
    fn header_fields() {
        let c = LineClassifier::default();
        let lines = [
            "  Jane Doe ",
            "Senior Product Manager",
            "jane@x.com | (555) 123-4567 | linkedin.com/in/jane",
            "Austin, TX",
            "JANE@X.COM",
            "Open to relocation.",
        ];
        let fields = parse_header(&c, &lines);
        assert_eq!(fields.name, "Jane Doe");
        assert_eq!(fields.headline.as_deref(), Some("Senior Product Manager"));
        assert_eq!(
            fields.contact,
            vec!["jane@x.com", "(555) 123-4567", "linkedin.com/in/jane", "Austin, TX"]
        );
        assert_eq!(fields.leftover, vec!["Open to relocation."]);
    }
}
