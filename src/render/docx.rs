//! DOCX renderer — WordprocessingML parts in a ZIP container.
//!
//! One paragraph per logical unit. Bullets use native numbering (`numId` 1)
//! so word processors treat them as real list items. Entry timestamps are
//! pinned to the ZIP epoch, which keeps repeated renders byte-identical.

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::emphasis;
use crate::fallback::{RawDocument, RawKind};
use crate::model::*;
use crate::render::{text_lines, RenderSource, Renderer};
use crate::Error;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Text width between 0.75in margins on US Letter, in twips.
const TEXT_WIDTH: u32 = 10080;
const MARGIN: u32 = 1080;

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

pub struct DocxRenderer;

impl Renderer for DocxRenderer {
    fn render(&self, source: &RenderSource<'_>) -> Result<Vec<u8>, Error> {
        let mut body = Body::default();
        match source {
            RenderSource::Structured(doc) => body.document(doc),
            RenderSource::Raw(raw) => body.raw(raw),
        }
        package(&[
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/document.xml", body.into_xml()),
            ("word/styles.xml", styles_xml()),
            ("word/numbering.xml", numbering_xml()),
        ])
    }

    fn file_extension(&self) -> &str {
        "docx"
    }
}

fn package(parts: &[(&str, String)]) -> Result<Vec<u8>, Error> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, xml) in parts {
        zip.start_file(*name, options)?;
        zip.write_all(XML_DECL.as_bytes())?;
        zip.write_all(xml.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

// -- Paragraphs -----------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct RunStyle {
    bold: bool,
    italic: bool,
    /// Half-points
    size: Option<u32>,
    muted: bool,
}

const PLAIN_RUN: RunStyle = RunStyle {
    bold: false,
    italic: false,
    size: None,
    muted: false,
};

const BOLD_RUN: RunStyle = RunStyle {
    bold: true,
    ..PLAIN_RUN
};

const ITALIC_RUN: RunStyle = RunStyle {
    italic: true,
    ..PLAIN_RUN
};

const MUTED_RUN: RunStyle = RunStyle {
    muted: true,
    ..PLAIN_RUN
};

const NAME_RUN: RunStyle = RunStyle {
    size: Some(36),
    ..BOLD_RUN
};

const HEADLINE_RUN: RunStyle = RunStyle {
    size: Some(24),
    ..PLAIN_RUN
};

const CONTACT_RUN: RunStyle = RunStyle {
    size: Some(18),
    ..MUTED_RUN
};

const SECTION_RUN: RunStyle = RunStyle {
    size: Some(24),
    ..BOLD_RUN
};

#[derive(Debug, Clone, Copy)]
struct ParaStyle {
    style: Option<&'static str>,
    keep_next: bool,
    bullet: bool,
    rule: bool,
    right_tab: bool,
    /// Space before, in twips
    before: u32,
    after: u32,
    align: Option<&'static str>,
}

const NAME: ParaStyle = ParaStyle {
    style: Some("Title"),
    keep_next: false,
    bullet: false,
    rule: false,
    right_tab: false,
    before: 0,
    after: 40,
    align: Some("center"),
};

const CENTERED: ParaStyle = ParaStyle {
    align: Some("center"),
    after: 20,
    ..PLAIN
};

const SECTION: ParaStyle = ParaStyle {
    style: Some("Heading1"),
    keep_next: true,
    rule: true,
    before: 240,
    after: 80,
    ..PLAIN
};

const ROLE: ParaStyle = ParaStyle {
    keep_next: true,
    right_tab: true,
    before: 160,
    ..PLAIN
};

const COMPANY: ParaStyle = ParaStyle {
    keep_next: true,
    after: 40,
    ..PLAIN
};

const BULLET: ParaStyle = ParaStyle {
    bullet: true,
    after: 20,
    ..PLAIN
};

const PLAIN: ParaStyle = ParaStyle {
    style: None,
    keep_next: false,
    bullet: false,
    rule: false,
    right_tab: false,
    before: 60,
    after: 0,
    align: None,
};

const DATE_LINE: ParaStyle = ParaStyle {
    align: Some("right"),
    ..PLAIN
};

#[derive(Default)]
struct Body {
    xml: String,
    /// The next paragraph directly follows a section header
    after_header: bool,
}

impl Body {
    fn document(&mut self, doc: &ResumeDocument) {
        if !doc.name.is_empty() {
            self.paragraph(NAME, &runs(&doc.name, NAME_RUN));
        }
        if let Some(headline) = &doc.headline {
            self.paragraph(CENTERED, &runs(headline, HEADLINE_RUN));
        }
        if !doc.contact.is_empty() {
            let contact = doc.contact.join("  |  ");
            self.paragraph(CENTERED, &runs(&contact, CONTACT_RUN));
        }
        for section in &doc.sections {
            self.section(section);
        }
    }

    fn section(&mut self, section: &Section) {
        if !section.title.is_empty() {
            self.header(&section.title);
        }
        match &section.body {
            SectionBody::Text(text) => {
                for (bullet, line) in text_lines(text) {
                    let style = if bullet { BULLET } else { PLAIN };
                    self.paragraph(style, &runs(line, PLAIN_RUN));
                }
            }
            SectionBody::Roles(roles) => {
                for role in roles {
                    self.role(role);
                }
            }
            SectionBody::Achievements(items) => {
                for item in items {
                    let mut xml = runs(&item.headline, BOLD_RUN);
                    if let Some(description) = &item.description {
                        xml.push_str(&run(": ", PLAIN_RUN));
                        xml.push_str(&runs(description, PLAIN_RUN));
                    }
                    self.paragraph(BULLET, &xml);
                }
            }
            SectionBody::Items(items) => {
                for item in items {
                    self.paragraph(BULLET, &runs(item, PLAIN_RUN));
                }
            }
            SectionBody::Education(entries) => {
                for entry in entries {
                    self.paragraph(BULLET, &education_runs(entry));
                }
            }
        }
    }

    fn header(&mut self, title: &str) {
        let title = emphasis::strip(title);
        self.paragraph(SECTION, &run(&title, SECTION_RUN));
        self.after_header = true;
    }

    /// Bold title, date pushed to the right margin by a tab stop.
    fn role(&mut self, role: &Role) {
        let mut xml = runs(&role.title, BOLD_RUN);
        if let Some(dates) = role.date_label() {
            xml.push_str("<w:r><w:tab/></w:r>");
            xml.push_str(&run(&dates, MUTED_RUN));
        }
        self.paragraph(ROLE, &xml);
        if let Some(company) = role.company_label() {
            self.paragraph(COMPANY, &runs(&company, ITALIC_RUN));
        }
        for bullet in &role.bullets {
            self.paragraph(BULLET, &runs(bullet, PLAIN_RUN));
        }
    }

    fn raw(&mut self, raw: &RawDocument) {
        for line in raw.content() {
            let text = line.text.as_str();
            match line.kind {
                RawKind::Name => self.paragraph(NAME, &runs(text, NAME_RUN)),
                RawKind::Contact => self.paragraph(CENTERED, &runs(text, CONTACT_RUN)),
                RawKind::Header => self.header(text),
                RawKind::Bullet => self.paragraph(BULLET, &runs(text, PLAIN_RUN)),
                RawKind::Date => self.paragraph(DATE_LINE, &runs(text, MUTED_RUN)),
                RawKind::Blank | RawKind::Text => self.paragraph(PLAIN, &runs(text, PLAIN_RUN)),
            }
        }
    }

    fn paragraph(&mut self, style: ParaStyle, runs: &str) {
        let before = if std::mem::take(&mut self.after_header) {
            0
        } else {
            style.before
        };

        // Child order follows the CT_PPr schema sequence
        let mut ppr = String::new();
        if let Some(id) = style.style {
            ppr.push_str(&format!("<w:pStyle w:val=\"{id}\"/>"));
        }
        if style.keep_next {
            ppr.push_str("<w:keepNext/>");
        }
        if style.bullet {
            ppr.push_str("<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr>");
        }
        if style.rule {
            ppr.push_str(
                "<w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"333333\"/></w:pBdr>",
            );
        }
        if style.right_tab {
            ppr.push_str(&format!(
                "<w:tabs><w:tab w:val=\"right\" w:pos=\"{TEXT_WIDTH}\"/></w:tabs>"
            ));
        }
        ppr.push_str(&format!("<w:spacing w:before=\"{before}\" w:after=\"{}\"/>", style.after));
        if let Some(align) = style.align {
            ppr.push_str(&format!("<w:jc w:val=\"{align}\"/>"));
        }

        self.xml.push_str(&format!("<w:p><w:pPr>{ppr}</w:pPr>{runs}</w:p>"));
    }

    fn into_xml(self) -> String {
        format!(
            "<w:document xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\"><w:body>{}<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/><w:pgMar w:top=\"{MARGIN}\" w:right=\"{MARGIN}\" w:bottom=\"{MARGIN}\" w:left=\"{MARGIN}\" w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr></w:body></w:document>",
            self.xml
        )
    }
}

fn education_runs(entry: &EducationEntry) -> String {
    let mut xml = String::new();
    if let Some(degree) = &entry.degree {
        xml.push_str(&runs(degree, BOLD_RUN));
    }
    if let Some(institution) = &entry.institution {
        if !xml.is_empty() {
            xml.push_str(&run(", ", PLAIN_RUN));
        }
        xml.push_str(&runs(institution, PLAIN_RUN));
    }
    if let Some(details) = &entry.details {
        if !xml.is_empty() {
            xml.push_str(&run(" ", PLAIN_RUN));
        }
        xml.push_str(&runs(details, MUTED_RUN));
    }
    xml
}

/// Emphasis-aware runs: strong spans become bold runs.
fn runs(text: &str, base: RunStyle) -> String {
    emphasis::tokenize(text)
        .into_iter()
        .map(|span| {
            run(
                span.text,
                RunStyle {
                    bold: base.bold || span.strong,
                    ..base
                },
            )
        })
        .collect()
}

fn run(text: &str, style: RunStyle) -> String {
    // Child order follows the CT_RPr schema sequence
    let mut rpr = String::new();
    if style.bold {
        rpr.push_str("<w:b/>");
    }
    if style.italic {
        rpr.push_str("<w:i/>");
    }
    if style.muted {
        rpr.push_str("<w:color w:val=\"555555\"/>");
    }
    if let Some(size) = style.size {
        rpr.push_str(&format!("<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>"));
    }
    let rpr = if rpr.is_empty() {
        rpr
    } else {
        format!("<w:rPr>{rpr}</w:rPr>")
    };
    format!("<w:r>{rpr}<w:t xml:space=\"preserve\">{}</w:t></w:r>", escape(text))
}

// -- Package parts --------------------------------------------------------------

fn styles_xml() -> String {
    format!(
        "<w:styles xmlns:w=\"{W_NS}\">\
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\" w:eastAsia=\"Calibri\" w:cs=\"Calibri\"/><w:sz w:val=\"21\"/><w:szCs w:val=\"21\"/><w:lang w:val=\"en-US\"/></w:rPr></w:rPrDefault>\
<w:pPrDefault><w:pPr><w:spacing w:after=\"0\" w:line=\"264\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault></w:docDefaults>\
<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>\
<w:style w:type=\"paragraph\" w:styleId=\"Title\"><w:name w:val=\"Title\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/></w:style>\
<w:style w:type=\"paragraph\" w:styleId=\"Heading1\"><w:name w:val=\"heading 1\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val=\"0\"/></w:pPr><w:rPr><w:caps/></w:rPr></w:style>\
</w:styles>"
    )
}

fn numbering_xml() -> String {
    format!(
        "<w:numbering xmlns:w=\"{W_NS}\">\
<w:abstractNum w:abstractNumId=\"0\"><w:multiLevelType w:val=\"singleLevel\"/>\
<w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"•\"/><w:lvlJc w:val=\"left\"/><w:pPr><w:ind w:left=\"360\" w:hanging=\"360\"/></w:pPr></w:lvl>\
</w:abstractNum><w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num></w:numbering>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::Read;

    const RESUME: &str = "\
Jane Doe
jane@x.com | (555) 123-4567

EXPERIENCE
Senior Product Manager
Acme Corp | Austin, TX | Jan 2021 – Present
• Grew revenue by **35%**
• Shipped <X> & Y

SKILLS
Roadmapping, SQL
";

    fn render(text: &str) -> Vec<u8> {
        let prepared = Pipeline::default().prepare(text);
        DocxRenderer.render(&prepared.source()).unwrap()
    }

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    /// Paragraph texts from `<w:t>` elements.
    fn paragraphs(document_xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(document_xml);
        let mut out = Vec::new();
        let mut current = String::new();
        let mut in_text = false;
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
                Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
                Event::End(e) if e.local_name().as_ref() == b"p" => {
                    out.push(std::mem::take(&mut current))
                }
                Event::Text(e) if in_text => current.push_str(&e.unescape().unwrap()),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        out
    }

    #[test]
    fn container_has_every_part() {
        let bytes = render(RESUME);
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<_> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/numbering.xml",
                "word/styles.xml",
            ]
        );
    }

    #[test]
    fn paragraph_per_unit() {
        let xml = part(&render(RESUME), "word/document.xml");
        assert_eq!(
            paragraphs(&xml),
            vec![
                "Jane Doe",
                "jane@x.com  |  (555) 123-4567",
                "EXPERIENCE",
                "Senior Product ManagerJan 2021 – Present",
                "Acme Corp · Austin, TX",
                "Grew revenue by 35%",
                "Shipped <X> & Y",
                "SKILLS",
                "Roadmapping",
                "SQL",
            ]
        );
        assert_eq!(xml.matches("<w:numPr>").count(), 4);
    }

    #[test]
    fn emphasis_is_a_bold_run() {
        let xml = part(&render(RESUME), "word/document.xml");
        assert!(xml.contains(
            "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">35%</w:t></w:r>"
        ));
        assert!(!xml.contains("**"));
        assert!(xml.contains("Shipped &lt;X&gt; &amp; Y"));
    }

    #[test]
    fn no_space_after_section_header() {
        let xml = part(&render(RESUME), "word/document.xml");
        let header_end = xml.find("EXPERIENCE</w:t></w:r></w:p>").unwrap();
        let next = &xml[header_end..];
        let next = &next[next.find("<w:p>").unwrap()..];
        let role_paragraph = &next[..next.find("</w:p>").unwrap()];
        assert!(role_paragraph.starts_with("<w:p><w:pPr><w:keepNext/><w:tabs>"));
        assert!(role_paragraph.contains("<w:spacing w:before=\"0\""));
        assert!(xml.contains("<w:tab w:val=\"right\" w:pos=\"10080\"/>"));
    }

    #[test]
    fn output_is_byte_identical() {
        assert_eq!(render(RESUME), render(RESUME));
    }

    #[test]
    fn raw_fallback_keeps_every_line() {
        let text = "Jane Doe\nloose prose line\n• one\n• two\nMore prose";
        let xml = part(&render(text), "word/document.xml");
        assert_eq!(
            paragraphs(&xml),
            vec!["Jane Doe", "loose prose line", "one", "two", "More prose"]
        );
        assert_eq!(xml.matches("<w:numPr>").count(), 2);
    }
}
