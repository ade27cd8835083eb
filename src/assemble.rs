//! Document assembler — header fields, section bodies and roles combined
//! into one [`ResumeDocument`].

use tracing::debug;

use crate::classify::LineClassifier;
use crate::model::{ResumeDocument, Section, SectionBody, SectionKind};
use crate::roles::build_roles;
use crate::sections;
use crate::segment::{parse_header, segment, RawSection};

impl LineClassifier {
    /// Parse untrimmed lines (blank lines included) into a document.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> ResumeDocument {
        let mut doc = ResumeDocument::default();

        for raw in segment(self, lines) {
            if raw.kind == SectionKind::Header {
                let fields = parse_header(self, &raw.lines);
                doc.name = fields.name;
                doc.headline = fields.headline;
                doc.contact = fields.contact;
                if !fields.leftover.is_empty() {
                    doc.sections.push(Section::new(
                        SectionKind::Header,
                        "",
                        SectionBody::Text(fields.leftover.join("\n")),
                    ));
                }
                continue;
            }
            let body = self.section_body(&raw);
            doc.sections.push(Section::new(raw.kind, raw.title, body));
        }

        debug!(
            sections = doc.sections.len(),
            roles = doc.roles().count(),
            name = %doc.name,
            "assembled document"
        );
        doc
    }

    fn section_body(&self, raw: &RawSection<'_>) -> SectionBody {
        let lines = raw.lines.as_slice();
        match raw.kind {
            SectionKind::Experience => SectionBody::Roles(build_roles(self, lines)),
            SectionKind::Education => SectionBody::Education(sections::education(self, lines)),
            SectionKind::Skills => SectionBody::Items(sections::skills(lines)),
            SectionKind::Certifications => SectionBody::Items(sections::certifications(lines)),
            SectionKind::Achievements => SectionBody::Achievements(sections::achievements(lines)),
            SectionKind::Header | SectionKind::Summary | SectionKind::Other => {
                SectionBody::Text(sections::text_body(lines))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segmentation_boundary() {
        let doc = LineClassifier::default().parse(&[
            "Jane Doe",
            "jane@x.com",
            "SUMMARY",
            "Builds things.",
            "EXPERIENCE",
            "Senior PM",
            "• Did Y",
        ]);
        assert_eq!(doc.name, "Jane Doe");
        assert_eq!(doc.contact, vec!["jane@x.com"]);
        let kinds: Vec<_> = doc.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SectionKind::Summary, SectionKind::Experience]);
        assert_eq!(doc.sections[0].body, SectionBody::Text("Builds things.".into()));
        assert_eq!(doc.roles().count(), 1);
    }

    #[test]
    fn header_leftovers_become_header_text() {
        let doc = LineClassifier::default().parse(&[
            "Jane Doe",
            "Open to relocation within the EU.",
            "SKILLS",
            "Rust, Go",
        ]);
        assert_eq!(doc.sections[0].kind, SectionKind::Header);
        assert_eq!(
            doc.sections[0].body,
            SectionBody::Text("Open to relocation within the EU.".into())
        );
        assert_eq!(
            doc.section(SectionKind::Skills).map(|s| &s.body),
            Some(&SectionBody::Items(vec!["Rust".into(), "Go".into()]))
        );
    }

    #[test]
    fn headerless_input_is_one_other_section() {
        let doc = LineClassifier::default().parse(&["just", "some words"]);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].kind, SectionKind::Other);
        assert_eq!(doc.roles().count(), 0);
    }

    #[test]
    fn parse_is_deterministic() {
        let lines = ["Jane Doe", "EXPERIENCE", "Engineer", "Acme Corp", "• a"];
        let c = LineClassifier::default();
        assert_eq!(c.parse(&lines), c.parse(&lines));
    }
}
