//! Body parsers for the non-experience sections.
//!
//! Every parser keeps each non-blank source line in some output unit, so a
//! bullet line in the source is always at least one list unit here.

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::{strip_bullet, LineClassifier};
use crate::model::{starts_with_bullet, Achievement, EducationEntry};

static RE_EDU_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:[|·•]|\t|\s[–—-]\s)\s*|\s{3,}").unwrap());

static RE_HONORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:gpa|honou?rs|cum laude|magna|summa|dean'?s list|distinction|valedictorian|thesis|minor|coursework)\b")
        .unwrap()
});

/// Achievement separators after the headline.
const ACHIEVEMENT_SEPARATORS: &[&str] = &[":", " – ", " — "];

/// Non-blank lines, trimmed, joined with newlines.
pub fn text_body(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// -- Skills & certifications ----------------------------------------------------

/// Skill items. A "Label: a, b" line stays whole; other lines split on list
/// separators outside parentheses and emphasis.
pub fn skills(lines: &[&str]) -> Vec<String> {
    let mut items = Vec::new();
    for line in lines {
        let text = strip_bullet(line);
        if text.is_empty() {
            continue;
        }
        if has_label(text) {
            items.push(text.to_string());
            continue;
        }
        let before = items.len();
        items.extend(split_list(text));
        if items.len() == before {
            items.push(text.to_string());
        }
    }
    items
}

/// One certification per non-blank line.
pub fn certifications(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|l| strip_bullet(l))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn has_label(text: &str) -> bool {
    split_outside_emphasis(text, ":").is_some_and(|(label, rest)| {
        let words = label.split_whitespace().count();
        (1..=4).contains(&words) && !rest.trim().is_empty()
    })
}

/// Split on `,` `;` `|` `•` `·` at paren depth zero and outside `**` pairs.
fn split_list(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut strong = false;
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '*' if chars.peek().is_some_and(|&(_, n)| n == '*') => {
                chars.next();
                strong = !strong;
            }
            ',' | ';' | '|' | '•' | '·' if depth == 0 && !strong => {
                push_item(&mut items, &text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    push_item(&mut items, &text[start..]);
    items
}

fn push_item(items: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        items.push(piece.to_string());
    }
}

// -- Achievements ---------------------------------------------------------------

/// One achievement per line; un-glyphed lines inside a bulleted list wrap
/// onto the previous achievement.
pub fn achievements(lines: &[&str]) -> Vec<Achievement> {
    let bulleted = lines.iter().any(|l| starts_with_bullet(l.trim()));
    let mut out: Vec<Achievement> = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        let text = strip_bullet(trimmed);
        if text.is_empty() {
            continue;
        }
        let wraps = bulleted && !starts_with_bullet(trimmed);
        if let (true, Some(last)) = (wraps, out.last_mut()) {
            let target = last.description.get_or_insert_with(String::new);
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(text);
            continue;
        }
        out.push(achievement(text));
    }
    out
}

/// "Headline: description" or "Headline – description".
pub fn achievement(text: &str) -> Achievement {
    let split = ACHIEVEMENT_SEPARATORS
        .iter()
        .filter_map(|sep| split_outside_emphasis(text, sep))
        .min_by_key(|(head, _)| head.len());
    match split {
        Some((head, rest)) if !head.trim().is_empty() && !rest.trim().is_empty() => Achievement {
            headline: head.trim().to_string(),
            description: Some(rest.trim().to_string()),
        },
        _ => Achievement {
            headline: text.trim().to_string(),
            description: None,
        },
    }
}

/// First occurrence of `sep` with an even number of `**` markers before it.
fn split_outside_emphasis<'a>(text: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    text.match_indices(sep)
        .map(|(i, _)| i)
        .find(|&i| text[..i].matches("**").count() % 2 == 0)
        .map(|i| (&text[..i], &text[i + sep.len()..]))
}

// -- Education --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Degree,
    Institution,
    Detail,
    Unknown,
}

/// Group education lines into entries.
///
/// A blank line or a bullet closes the current entry, as does a degree or
/// institution arriving when that slot is already filled.
pub fn education(classifier: &LineClassifier, lines: &[&str]) -> Vec<EducationEntry> {
    let mut entries = Vec::new();
    let mut current = EducationEntry::default();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            close(&mut entries, &mut current);
            continue;
        }
        if starts_with_bullet(trimmed) {
            close(&mut entries, &mut current);
        }
        let text = strip_bullet(trimmed);
        if text.is_empty() {
            continue;
        }
        for (kind, piece) in pieces(classifier, text) {
            let collides = match kind {
                Piece::Degree => current.degree.is_some(),
                Piece::Institution => current.institution.is_some(),
                Piece::Detail | Piece::Unknown => false,
            };
            if collides {
                close(&mut entries, &mut current);
            }
            match kind {
                Piece::Degree => current.degree = Some(piece),
                Piece::Institution => current.institution = Some(piece),
                Piece::Unknown if current.institution.is_none() => {
                    current.institution = Some(piece)
                }
                Piece::Detail | Piece::Unknown => append_detail(&mut current, &piece),
            }
        }
        if starts_with_bullet(trimmed) {
            close(&mut entries, &mut current);
        }
    }
    close(&mut entries, &mut current);
    entries
}

fn close(entries: &mut Vec<EducationEntry>, current: &mut EducationEntry) {
    if !current.is_empty() {
        entries.push(std::mem::take(current));
    }
}

fn append_detail(entry: &mut EducationEntry, piece: &str) {
    match entry.details.as_mut() {
        Some(details) => {
            details.push_str("; ");
            details.push_str(piece);
        }
        None => entry.details = Some(piece.to_string()),
    }
}

/// Segments of one line, comma pieces regrouped so an unclassified piece
/// stays attached to the one before it ("University of California, Berkeley").
fn pieces(classifier: &LineClassifier, text: &str) -> Vec<(Piece, String)> {
    let mut out: Vec<(Piece, String)> = Vec::new();
    for segment in RE_EDU_SPLIT.split(text) {
        let mut grouped: Vec<(Piece, String)> = Vec::new();
        for part in segment.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let kind = piece_kind(classifier, part);
            match grouped.last_mut() {
                Some((_, prev)) if kind == Piece::Unknown => {
                    prev.push_str(", ");
                    prev.push_str(part);
                }
                _ => grouped.push((kind, part.to_string())),
            }
        }
        out.extend(grouped);
    }
    out
}

fn piece_kind(classifier: &LineClassifier, part: &str) -> Piece {
    // "MA" after a city is a state code, not a degree
    if part.len() <= 2 && part.chars().all(|c| c.is_ascii_uppercase()) {
        return Piece::Unknown;
    }
    if classifier.is_institution(part) {
        Piece::Institution
    } else if classifier.is_degree(part) {
        Piece::Degree
    } else if classifier.has_date(part) || RE_HONORS.is_match(part) {
        Piece::Detail
    } else {
        Piece::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_split_and_labels() {
        let lines = [
            "• Rust, Go, Python (pandas, numpy)",
            "Languages: English, Spanish",
            "",
            "SQL | **Kafka, Flink** | dbt",
        ];
        assert_eq!(
            skills(&lines),
            vec![
                "Rust",
                "Go",
                "Python (pandas, numpy)",
                "Languages: English, Spanish",
                "SQL",
                "**Kafka, Flink**",
                "dbt"
            ]
        );
    }

    #[test]
    fn achievement_headline_split() {
        let a = achievement("President's Award: top 1% of sales org");
        assert_eq!(a.headline, "President's Award");
        assert_eq!(a.description.as_deref(), Some("top 1% of sales org"));

        let a = achievement("Hackathon winner – built a fraud model in 24h");
        assert_eq!(a.headline, "Hackathon winner");

        let a = achievement("**Award:** for speed");
        assert_eq!(a.headline, "**Award:** for speed");
        assert_eq!(a.description, None);

        assert_eq!(achievement("Plain line").description, None);
    }

    #[test]
    fn achievement_wrapped_lines() {
        let out = achievements(&[
            "• Patent: adaptive",
            "caching for CDNs",
            "• Speaker at RustConf",
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].description.as_deref(), Some("adaptive caching for CDNs"));
    }

    #[test]
    fn education_entries() {
        let c = LineClassifier::default();
        let lines = [
            "B.S. Computer Science, Stanford University, 2015",
            "",
            "University of California, Berkeley",
            "MBA | 2020 | Dean's List",
        ];
        let entries = education(&c, &lines);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].degree.as_deref(), Some("B.S. Computer Science"));
        assert_eq!(entries[0].institution.as_deref(), Some("Stanford University"));
        assert_eq!(entries[0].details.as_deref(), Some("2015"));
        assert_eq!(entries[1].institution.as_deref(), Some("University of California, Berkeley"));
        assert_eq!(entries[1].degree.as_deref(), Some("MBA"));
        assert_eq!(entries[1].details.as_deref(), Some("2020; Dean's List"));
    }

    #[test]
    fn education_bullets_are_separate_entries() {
        let c = LineClassifier::default();
        let entries = education(&c, &["• Coursera ML", "• AWS bootcamp"]);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.is_empty()));
    }

    #[test]
    fn text_body_drops_blanks() {
        assert_eq!(text_body(&["  a ", "", "b"]), "a\nb");
    }
}
