//! Single-line predicates over résumé text.
//!
//! Each predicate looks at one line in isolation. [`LineClassifier::classify`]
//! applies them in a fixed priority order and the first match wins:
//! bullet > metadata (date/location) > role title > company > header > prose.

use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::LazyLock;

use crate::emphasis;
use crate::lexicon::Lexicon;
use crate::model::{starts_with_bullet, SectionKind, BULLET_GLYPHS};

/// Titles longer than this read as prose.
const MAX_TITLE_WORDS: usize = 8;
/// Words a Title-Case phrase may have and still read as a company name.
const MAX_COMPANY_WORDS: usize = 5;
/// Words a line with a company lexicon hit may have.
const MAX_COMPANY_HIT_WORDS: usize = 8;
/// Non-date, non-location words a metadata line may carry.
const MAX_METADATA_RESIDUE_WORDS: usize = 8;
/// Catch-all ALL-CAPS header length bounds, in characters.
const CAPS_HEADER_LEN: Range<usize> = 3..50;

// -- Regex patterns -----------------------------------------------------------

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static RE_DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let token =
        format!(r"(?:{MONTH}\s+(?:19|20)\d{{2}}|\d{{1,2}}/(?:19|20)\d{{2}}|(?:19|20)\d{{2}})");
    Regex::new(&format!(
        r"(?i)\b({token})\s*(?:[–—-]|to)\s*({token}|present|current|now|today)\b"
    ))
    .unwrap()
});

static RE_SINGLE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:{MONTH}\s+(?:19|20)\d{{2}}|\d{{1,2}}/(?:19|20)\d{{2}}|(?:19|20)\d{{2}})$"
    ))
    .unwrap()
});

static RE_CITY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z.'\-]*(?:\s+[A-Z][A-Za-z.'\-]*)*,\s*[A-Z]{2}(?:\s*\([^)]*\)|\s*,\s*[A-Za-z .]+)?$")
        .unwrap()
});

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+\-]+@[\w\-]+\.[\w.\-]+").unwrap());

static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d\s().\-]{7,}\d").unwrap());

static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bhttps?://|\bwww\.").unwrap());

// Metadata segment separators: pipes, middle dots, inline bullets, tabs,
// spaced dashes and the wide gaps left by right-aligned text.
static RE_SEGMENT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:[|·•]|\t|\s[–—-]\s)\s*|\s{3,}").unwrap());

static RE_CONTACT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[|·•]\s*|\t|\s{3,}").unwrap());

static RE_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:i{1,3}|iv|v|[a-z]?\d+)$").unwrap());

const CONNECTORS: &[&str] = &["of", "and", "&", "the", "for", "de", "at", "in", "on", "y", "und"];

const REMOTE_WORDS: &[&str] = &["remote", "hybrid", "on-site", "onsite"];

// -- Labels -------------------------------------------------------------------

/// Line label produced by [`LineClassifier::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Blank,
    Bullet,
    Metadata,
    RoleTitle,
    Company,
    Header(SectionKind),
    Prose,
}

/// A start/end pair as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Fields pulled out of a location/date line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Leading text that is neither a date nor a location
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Metadata {
    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

// -- Classifier ---------------------------------------------------------------

/// Line predicates backed by an injected [`Lexicon`].
#[derive(Debug, Clone)]
pub struct LineClassifier {
    headers: HashMap<String, SectionKind>,
    role_words: HashSet<String>,
    company_suffixes: HashSet<String>,
    known_companies: Vec<String>,
    location_words: HashSet<String>,
    network_domains: Vec<String>,
    degree_words: HashSet<String>,
    institution_words: HashSet<String>,
}

impl Default for LineClassifier {
    fn default() -> Self {
        LineClassifier::new(Lexicon::default())
    }
}

impl From<Lexicon> for LineClassifier {
    fn from(lexicon: Lexicon) -> Self {
        LineClassifier::new(lexicon)
    }
}

impl LineClassifier {
    pub fn new(lexicon: Lexicon) -> Self {
        let mut headers = HashMap::new();
        for (kind, synonyms) in lexicon.section_headers {
            for synonym in synonyms {
                headers.entry(synonym.to_lowercase()).or_insert(kind);
            }
        }
        let set = |words: Vec<String>| words.into_iter().map(|w| w.to_lowercase()).collect();
        LineClassifier {
            headers,
            role_words: set(lexicon.role_words),
            company_suffixes: set(lexicon.company_suffixes),
            known_companies: lexicon
                .known_companies
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
            location_words: set(lexicon.location_words),
            network_domains: lexicon
                .network_domains
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
            degree_words: set(lexicon.degree_words),
            institution_words: set(lexicon.institution_words),
        }
    }

    /// Label one line. First match wins in priority order.
    pub fn classify(&self, line: &str) -> LineKind {
        let line = line.trim();
        if line.is_empty() {
            LineKind::Blank
        } else if self.is_bullet(line) {
            LineKind::Bullet
        } else if self.metadata(line).is_some() {
            LineKind::Metadata
        } else if self.is_role_title(line) {
            LineKind::RoleTitle
        } else if self.is_company(line) {
            LineKind::Company
        } else if let Some(kind) = self.section_header(line) {
            LineKind::Header(kind)
        } else {
            LineKind::Prose
        }
    }

    pub fn is_bullet(&self, line: &str) -> bool {
        starts_with_bullet(line)
    }

    /// Section kind for a header line, if it is one.
    ///
    /// Known synonyms match the whole line case-insensitively. Any other
    /// ALL-CAPS line of 3–49 characters that nothing else claims opens an
    /// `Other` section.
    pub fn section_header(&self, line: &str) -> Option<SectionKind> {
        let line = line.trim();
        if line.is_empty() || self.is_bullet(line) {
            return None;
        }
        if let Some(kind) = self.header_synonym(line) {
            return Some(kind);
        }
        let plain = emphasis::strip(line);
        let plain = plain.trim().trim_end_matches(':').trim();
        if !CAPS_HEADER_LEN.contains(&plain.chars().count()) || !is_all_caps(plain) {
            return None;
        }
        if self.metadata(plain).is_some()
            || self.is_role_title(plain)
            || self.is_contact(plain)
            || self.has_company_hit(&words(plain))
        {
            return None;
        }
        Some(SectionKind::Other)
    }

    /// Whole-line synonym lookup, ignoring emphasis, case and a trailing colon.
    pub fn header_synonym(&self, line: &str) -> Option<SectionKind> {
        let key = header_key(line);
        if key.is_empty() {
            return None;
        }
        self.headers.get(&key).copied()
    }

    pub fn date_range(&self, line: &str) -> Option<DateRange> {
        find_date_range(line).map(|(range, _)| range)
    }

    /// Whether the line carries a bare date ("2019", "May 2020") or a range.
    pub fn has_date(&self, line: &str) -> bool {
        let plain = line.trim();
        find_date_range(plain).is_some()
            || split_segments(plain)
                .into_iter()
                .any(|seg| RE_SINGLE_DATE.is_match(clean_piece(seg)))
    }

    /// First location segment of the line.
    pub fn location(&self, line: &str) -> Option<String> {
        let plain = emphasis::strip(line.trim());
        let found = split_segments(&plain)
            .into_iter()
            .map(clean_piece)
            .find_map(|seg| self.split_location(seg).map(|(_, loc)| loc));
        found
    }

    pub fn is_location(&self, piece: &str) -> bool {
        let piece = piece.trim();
        if piece.is_empty() || piece.split_whitespace().count() > 6 {
            return false;
        }
        if RE_CITY_STATE.is_match(piece) {
            return true;
        }
        let lower = piece
            .trim_matches(|c: char| c == '(' || c == ')')
            .trim()
            .to_lowercase();
        if self.location_words.contains(&lower) {
            return true;
        }
        if let Some(first) = words(&lower).first() {
            if REMOTE_WORDS.contains(&first.as_str()) {
                return true;
            }
        }
        // "Berlin, Germany": a place name followed by a known region
        let parts: Vec<&str> = piece.split(',').map(str::trim).collect();
        if parts.len() != 2 || parts[0].is_empty() {
            return false;
        }
        let region = parts[1].to_lowercase();
        self.location_words.contains(&region)
            && !REMOTE_WORDS.contains(&region.as_str())
            && is_title_case(parts[0])
            && !self.is_role_title(parts[0])
    }

    /// Dates, location and leading company text from a metadata line.
    ///
    /// Returns `None` unless the line has a date or a location, and when the
    /// leftover text is long enough to be a sentence.
    pub fn metadata(&self, line: &str) -> Option<Metadata> {
        let plain = emphasis::strip(line.trim());
        let plain = plain.trim();
        if plain.is_empty() || self.is_bullet(plain) || self.is_contact(plain) {
            return None;
        }

        let mut meta = Metadata::default();
        let remainder = match find_date_range(plain) {
            Some((range, span)) => {
                meta.start_date = Some(range.start);
                meta.end_date = Some(range.end);
                format!("{} | {}", &plain[..span.start], &plain[span.end..])
            }
            None => plain.to_string(),
        };

        let mut rest: Vec<String> = Vec::new();
        for segment in split_segments(&remainder) {
            let segment = clean_piece(segment);
            if segment.is_empty() {
                continue;
            }
            if !meta.has_dates() && RE_SINGLE_DATE.is_match(segment) {
                meta.start_date = Some(segment.to_string());
                continue;
            }
            if meta.location.is_none() {
                if let Some((head, location)) = self.split_location(segment) {
                    meta.location = Some(location);
                    if !head.is_empty() {
                        rest.push(head);
                    }
                    continue;
                }
            }
            rest.push(segment.to_string());
        }

        if !meta.has_dates() && meta.location.is_none() {
            return None;
        }
        let residue = rest.join(" · ");
        if residue.split_whitespace().count() > MAX_METADATA_RESIDUE_WORDS {
            return None;
        }
        if !meta.has_dates() && !residue.is_empty() && self.is_role_title(&residue) {
            return None;
        }
        if !residue.is_empty() {
            meta.company = Some(residue);
        }
        Some(meta)
    }

    /// Seniority or function word at the start or end of a short line.
    pub fn is_role_title(&self, line: &str) -> bool {
        let plain = emphasis::strip(line.trim());
        let plain = plain.trim();
        if plain.is_empty()
            || self.is_bullet(plain)
            || find_date_range(plain).is_some()
            || self.is_contact(plain)
            || plain.ends_with(['!', '?', ':'])
        {
            return false;
        }
        let head = title_head(plain);
        let tokens = words(head);
        if tokens.is_empty() || tokens.len() > MAX_TITLE_WORDS {
            return false;
        }
        if head.ends_with('.') {
            let last = tokens.last().map(String::as_str).unwrap_or_default();
            if !self.role_words.contains(last) {
                return false;
            }
        }
        self.has_role_word_at_edge(head) || self.has_role_word_at_edge(first_clause(head))
    }

    /// Company lexicon hit, legal suffix, or a short Title-Case phrase that
    /// is not a role title.
    pub fn is_company(&self, line: &str) -> bool {
        let plain = emphasis::strip(line.trim());
        let plain = plain.trim();
        if plain.is_empty() || self.is_bullet(plain) || self.is_contact(plain) {
            return false;
        }
        let tokens = words(plain);
        if tokens.len() <= MAX_COMPANY_HIT_WORDS && self.has_company_hit(&tokens) {
            return true;
        }
        tokens.len() <= MAX_COMPANY_WORDS
            && !plain.ends_with(['.', '!', '?', ':'])
            && is_title_case(plain)
            && !is_all_caps(plain)
            && !self.is_role_title(plain)
            && self.header_synonym(plain).is_none()
    }

    /// Email, phone number, URL or professional-network domain.
    pub fn is_contact(&self, line: &str) -> bool {
        if RE_EMAIL.is_match(line) || RE_URL.is_match(line) {
            return true;
        }
        let lower = line.to_lowercase();
        if self.network_domains.iter().any(|d| lower.contains(d.as_str())) {
            return true;
        }
        RE_PHONE.find_iter(line).any(|m| {
            let digits = m.as_str().chars().filter(char::is_ascii_digit).count();
            (10..=15).contains(&digits) && find_date_range(m.as_str()).is_none()
        })
    }

    /// Contact items of a contact line, split on `|`, `•`, `·` and wide gaps.
    pub fn split_contact(&self, line: &str) -> Vec<String> {
        RE_CONTACT_SPLIT
            .split(line.trim())
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_degree(&self, text: &str) -> bool {
        words(text).iter().any(|w| {
            self.degree_words.contains(w) || self.degree_words.contains(w.trim_end_matches('.'))
        })
    }

    pub fn is_institution(&self, text: &str) -> bool {
        words(text).iter().any(|w| self.institution_words.contains(w))
    }

    fn has_role_word_at_edge(&self, clause: &str) -> bool {
        let tokens = words(clause);
        let first = tokens.first();
        let last = tokens.iter().rev().find(|t| !RE_LEVEL.is_match(t));
        let is_role_word = |t: &String| {
            self.role_words.contains(t) || self.role_words.contains(t.trim_end_matches('.'))
        };
        first.is_some_and(is_role_word) || last.is_some_and(is_role_word)
    }

    fn has_company_hit(&self, tokens: &[String]) -> bool {
        if tokens.is_empty() {
            return false;
        }
        let padded = format!(" {} ", tokens.join(" "));
        if self
            .known_companies
            .iter()
            .any(|k| padded.contains(&format!(" {k} ")))
        {
            return true;
        }
        let edge = |t: &String| {
            self.company_suffixes.contains(t)
                || self.company_suffixes.contains(t.trim_end_matches('.'))
        };
        // A lone suffix word ("Group", "Labs") is not a company on its own
        tokens.len() > 1 && (tokens.first().is_some_and(edge) || tokens.last().is_some_and(edge))
    }

    /// Split "Acme Corp, Austin, TX" into ("Acme Corp", "Austin, TX").
    fn split_location(&self, piece: &str) -> Option<(String, String)> {
        if self.is_location(piece) {
            return Some((String::new(), piece.to_string()));
        }
        let parts: Vec<&str> = piece.split(',').map(str::trim).collect();
        (1..parts.len()).find_map(|k| {
            let tail = parts[k..].join(", ");
            self.is_location(&tail)
                .then(|| (parts[..k].join(", "), tail))
        })
    }
}

// -- Helpers ------------------------------------------------------------------

/// Remove the leading bullet glyph and surrounding whitespace.
pub fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    if !starts_with_bullet(trimmed) {
        return trimmed;
    }
    BULLET_GLYPHS
        .iter()
        .find_map(|g| trimmed.strip_prefix(g))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn find_date_range(line: &str) -> Option<(DateRange, Range<usize>)> {
    let caps = RE_DATE_RANGE.captures(line)?;
    let whole = caps.get(0)?;
    Some((
        DateRange {
            start: collapse_whitespace(&caps[1]),
            end: collapse_whitespace(&caps[2]),
        },
        whole.range(),
    ))
}

fn split_segments(line: &str) -> Vec<&str> {
    RE_SEGMENT_SPLIT.split(line).collect()
}

/// Trim whitespace, separator punctuation, and one pair of wrapping parens.
fn clean_piece(piece: &str) -> &str {
    let piece = piece.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | ';' | ':' | '|' | '-' | '–' | '—')
    });
    match piece.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
        Some(inner) if !inner.contains(['(', ')']) => inner.trim(),
        _ => piece,
    }
}

/// Text before a " | " tail, which may carry company metadata.
pub(crate) fn title_head(line: &str) -> &str {
    line.split('|').next().unwrap_or(line).trim()
}

fn first_clause(text: &str) -> &str {
    let end = [",", " – ", " — ", " - ", "(", " / "]
        .iter()
        .filter_map(|sep| text.find(sep))
        .min()
        .unwrap_or(text.len());
    text[..end].trim()
}

/// Lower-cased tokens with edge punctuation removed (a trailing '.' is kept).
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| {
                matches!(c, ',' | ';' | ':' | '(' | ')' | '[' | ']' | '"' | '\'' | '|' | '*')
            })
            .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn header_key(line: &str) -> String {
    let plain = emphasis::strip(line.trim());
    let plain = plain.trim().trim_end_matches(':').trim();
    let tokens: Vec<&str> = plain.split_whitespace().collect();
    // "E X P E R I E N C E" letter-spaced headers
    let joined = if tokens.len() > 2 && tokens.iter().all(|t| t.chars().count() == 1) {
        tokens.concat()
    } else {
        tokens.join(" ")
    };
    joined.to_lowercase()
}

fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn is_title_case(text: &str) -> bool {
    let mut saw_word = false;
    for token in text.split_whitespace() {
        let Some(first) = token.chars().next() else {
            continue;
        };
        if !first.is_alphabetic() {
            continue;
        }
        if first.is_uppercase() {
            saw_word = true;
        } else if !CONNECTORS.contains(&token.to_lowercase().as_str()) {
            return false;
        }
    }
    saw_word
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
