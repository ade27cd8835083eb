//! Data model for a parsed résumé — format-agnostic.
//!
//! Every value here is built once per parse call. Re-parsing a rewritten
//! résumé produces a fresh [`ResumeDocument`]; nothing is patched in place.

use serde::Serialize;

/// Complete parsed résumé.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResumeDocument {
    /// Header-derived name (empty when none was found)
    pub name: String,
    /// Role/function line from the header block
    pub headline: Option<String>,
    /// Contact items, deduplicated, in source order
    pub contact: Vec<String>,
    /// Sections in source order
    pub sections: Vec<Section>,
}

impl ResumeDocument {
    /// All roles across every experience section, in order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.sections.iter().flat_map(|s| match &s.body {
            SectionBody::Roles(roles) => roles.as_slice(),
            _ => &[],
        })
    }

    /// First section of the given kind.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Number of list units a renderer emits for this document.
    pub fn list_unit_count(&self) -> usize {
        self.sections.iter().map(Section::list_unit_count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Achievements,
    Certifications,
    Other,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Achievements => "achievements",
            SectionKind::Certifications => "certifications",
            SectionKind::Other => "other",
        }
    }
}

/// A titled top-level grouping of the résumé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    /// Header text as written (empty for the implicit header block)
    pub title: String,
    pub body: SectionBody,
}

impl Section {
    /// Build a section, coercing the body to the shape its kind requires.
    ///
    /// A mismatched body is flattened to text rather than rejected, so a
    /// caller mistake can never drop content.
    pub fn new(kind: SectionKind, title: impl Into<String>, body: SectionBody) -> Self {
        let body = if body.matches(kind) {
            body
        } else {
            SectionBody::Text(body.to_plain_text())
        };
        let kind = if body.matches(kind) {
            kind
        } else {
            SectionKind::Other
        };
        Section {
            kind,
            title: title.into(),
            body,
        }
    }

    pub fn list_unit_count(&self) -> usize {
        match &self.body {
            SectionBody::Text(text) => text.lines().filter(|l| starts_with_bullet(l)).count(),
            SectionBody::Roles(roles) => roles.iter().map(|r| r.bullets.len()).sum(),
            SectionBody::Achievements(items) => items.len(),
            SectionBody::Items(items) => items.len(),
            SectionBody::Education(entries) => entries.len(),
        }
    }
}

/// Section content. The variant is fixed by [`SectionKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    /// Newline-separated lines, blank lines removed
    Text(String),
    Roles(Vec<Role>),
    Achievements(Vec<Achievement>),
    /// Skills or certifications
    Items(Vec<String>),
    Education(Vec<EducationEntry>),
}

impl SectionBody {
    pub fn matches(&self, kind: SectionKind) -> bool {
        matches!(
            (kind, self),
            (
                SectionKind::Header | SectionKind::Summary | SectionKind::Other,
                SectionBody::Text(_)
            ) | (SectionKind::Experience, SectionBody::Roles(_))
                | (SectionKind::Achievements, SectionBody::Achievements(_))
                | (
                    SectionKind::Skills | SectionKind::Certifications,
                    SectionBody::Items(_)
                )
                | (SectionKind::Education, SectionBody::Education(_))
        )
    }

    fn to_plain_text(&self) -> String {
        let lines: Vec<String> = match self {
            SectionBody::Text(text) => return text.clone(),
            SectionBody::Roles(roles) => roles
                .iter()
                .flat_map(|r| {
                    std::iter::once(r.title.clone())
                        .chain(r.company.clone())
                        .chain(r.bullets.iter().map(|b| format!("• {b}")))
                })
                .collect(),
            SectionBody::Achievements(items) => items
                .iter()
                .map(|a| match &a.description {
                    Some(d) => format!("• {}: {}", a.headline, d),
                    None => format!("• {}", a.headline),
                })
                .collect(),
            SectionBody::Items(items) => items.iter().map(|i| format!("• {i}")).collect(),
            SectionBody::Education(entries) => {
                entries.iter().map(|e| format!("• {}", e.summary())).collect()
            }
        };
        lines.join("\n")
    }
}

/// One job entry within the experience section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Role {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    /// Free-form token ("Jan 2020", "2020", "03/2019")
    pub start_date: Option<String>,
    /// Free-form token, including "Present"
    pub end_date: Option<String>,
    pub bullets: Vec<String>,
}

impl Role {
    /// "Jan 2021 – Present", or whichever half is known.
    pub fn date_label(&self) -> Option<String> {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => Some(format!("{start} – {end}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }

    /// "Acme Corp · Austin, TX", or whichever half is known.
    pub fn company_label(&self) -> Option<String> {
        match (&self.company, &self.location) {
            (Some(company), Some(location)) => Some(format!("{company} · {location}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub headline: String,
    pub description: Option<String>,
}

/// At least one field is always non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub institution: Option<String>,
    /// Year or honors text
    pub details: Option<String>,
}

impl EducationEntry {
    pub fn is_empty(&self) -> bool {
        self.degree.is_none() && self.institution.is_none() && self.details.is_none()
    }

    /// All present fields joined with ", ".
    pub fn summary(&self) -> String {
        [&self.degree, &self.institution, &self.details]
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Leading glyph check shared by the model and the classifier.
pub(crate) fn starts_with_bullet(line: &str) -> bool {
    let trimmed = line.trim_start();
    // "**Bold** lead" is emphasis, not a "*" bullet
    if trimmed.starts_with("**") {
        return false;
    }
    BULLET_GLYPHS.iter().any(|g| trimmed.starts_with(g))
}

/// Glyphs that open a bullet line after trimming.
pub(crate) const BULLET_GLYPHS: &[&str] = &[
    "•", "-", "*", "▪", "◦", "‣", "→", "●", "○", "■", "□", "►", "▸", "✓", "✔", "–",
];
