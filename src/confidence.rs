//! Confidence gate — structured rendering or raw-line fallback.
//!
//! The thresholds are empirical, so they live in [`GatePolicy`] rather than
//! in the checks themselves.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::classify::{strip_bullet, LineClassifier};
use crate::model::ResumeDocument;

/// Tunable gate thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    pub min_bullets_per_role: usize,
    pub require_company: bool,
    /// Placeholder titles that do not count as a recovered title
    pub generic_titles: Vec<String>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        GatePolicy {
            min_bullets_per_role: 1,
            require_company: true,
            generic_titles: vec!["Position".to_string(), "Experience".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "confidence", content = "reason", rename_all = "snake_case")]
pub enum Confidence {
    Structured,
    RawFallback(FallbackReason),
}

impl Confidence {
    pub fn is_structured(&self) -> bool {
        matches!(self, Confidence::Structured)
    }
}

/// First gate clause that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    NoRoles,
    RoleWithoutBullets { title: String, bullets: usize },
    NoCompany,
    OnlyGenericTitles,
    LostBullets { source: usize, rendered: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoRoles => write!(f, "no roles recovered"),
            FallbackReason::RoleWithoutBullets { title, bullets } => {
                write!(f, "role \"{title}\" has {bullets} bullet(s)")
            }
            FallbackReason::NoCompany => write!(f, "no role has a company"),
            FallbackReason::OnlyGenericTitles => write!(f, "every role title is a placeholder"),
            FallbackReason::LostBullets { source, rendered } => write!(
                f,
                "model has {rendered} list item(s) but the source has {source} bullet line(s)"
            ),
        }
    }
}

impl GatePolicy {
    /// Decide how `doc` should be rendered. `source_bullets` is the number of
    /// bullet lines in the input it was parsed from.
    pub fn assess(&self, doc: &ResumeDocument, source_bullets: usize) -> Confidence {
        let confidence = match self.first_failure(doc, source_bullets) {
            None => Confidence::Structured,
            Some(reason) => Confidence::RawFallback(reason),
        };
        match &confidence {
            Confidence::Structured => debug!("confidence gate passed"),
            Confidence::RawFallback(reason) => debug!(%reason, "confidence gate failed"),
        }
        confidence
    }

    fn first_failure(&self, doc: &ResumeDocument, source_bullets: usize) -> Option<FallbackReason> {
        let roles: Vec<_> = doc.roles().collect();
        if roles.is_empty() {
            return Some(FallbackReason::NoRoles);
        }
        if let Some(role) = roles.iter().find(|r| r.bullets.len() < self.min_bullets_per_role) {
            return Some(FallbackReason::RoleWithoutBullets {
                title: role.title.clone(),
                bullets: role.bullets.len(),
            });
        }
        let has_company = roles
            .iter()
            .any(|r| r.company.as_deref().is_some_and(|c| !c.trim().is_empty()));
        if self.require_company && !has_company {
            return Some(FallbackReason::NoCompany);
        }
        if roles.iter().all(|r| self.is_generic(&r.title)) {
            return Some(FallbackReason::OnlyGenericTitles);
        }
        let rendered = doc.list_unit_count();
        if rendered < source_bullets {
            return Some(FallbackReason::LostBullets {
                source: source_bullets,
                rendered,
            });
        }
        None
    }

    fn is_generic(&self, title: &str) -> bool {
        let title = title.trim();
        title.is_empty() || self.generic_titles.iter().any(|g| g.eq_ignore_ascii_case(title))
    }
}

/// Bullet lines with text after the glyph.
pub fn source_bullet_count<S: AsRef<str>>(classifier: &LineClassifier, lines: &[S]) -> usize {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| classifier.is_bullet(l) && !strip_bullet(l).is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(lines: &[&str]) -> Confidence {
        let c = LineClassifier::default();
        let doc = c.parse(lines);
        GatePolicy::default().assess(&doc, source_bullet_count(&c, lines))
    }

    #[test]
    fn well_formed_resume_is_structured() {
        let confidence = gate(&[
            "Jane Doe",
            "EXPERIENCE",
            "Senior Product Manager",
            "Acme Corp | Austin, TX | Jan 2021 – Present",
            "• Shipped X",
            "• Grew revenue by **35%**",
        ]);
        assert_eq!(confidence, Confidence::Structured);
    }

    #[test]
    fn no_headers_falls_back() {
        assert_eq!(
            gate(&["some words", "• a bullet"]),
            Confidence::RawFallback(FallbackReason::NoRoles)
        );
    }

    #[test]
    fn role_without_bullets_falls_back() {
        let confidence = gate(&[
            "EXPERIENCE",
            "Senior PM",
            "Acme Corp | 2020 - 2021",
            "• a",
            "Engineer",
            "Initech Technologies | 2018 - 2020",
        ]);
        assert!(matches!(
            confidence,
            Confidence::RawFallback(FallbackReason::RoleWithoutBullets { .. })
        ));
    }

    #[test]
    fn missing_company_falls_back() {
        assert_eq!(
            gate(&["EXPERIENCE", "Senior PM", "2020 - 2021", "• a"]),
            Confidence::RawFallback(FallbackReason::NoCompany)
        );
    }

    #[test]
    fn placeholder_titles_fall_back() {
        let c = LineClassifier::default();
        let doc = c.parse(&["EXPERIENCE", "• a"]);
        let policy = GatePolicy {
            require_company: false,
            ..GatePolicy::default()
        };
        assert_eq!(
            policy.assess(&doc, 1),
            Confidence::RawFallback(FallbackReason::OnlyGenericTitles)
        );
    }

    #[test]
    fn lost_bullets_fall_back() {
        let c = LineClassifier::default();
        let doc = c.parse(&["EXPERIENCE", "Senior PM", "Acme Corp", "• a"]);
        assert!(matches!(
            GatePolicy::default().assess(&doc, 5),
            Confidence::RawFallback(FallbackReason::LostBullets { source: 5, rendered: 1 })
        ));
    }

    #[test]
    fn glyph_only_lines_are_not_bullets() {
        let c = LineClassifier::default();
        assert_eq!(source_bullet_count(&c, &["•", " - a", "text"]), 1);
    }
}
