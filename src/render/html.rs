//! HTML renderer — self-contained, print-ready fragment with inline styles.
//!
//! The fragment is sized to a US Letter page at 96 dpi so a headless browser
//! can capture it straight to PDF.

use crate::emphasis;
use crate::fallback::{RawDocument, RawKind};
use crate::model::*;
use crate::render::{html_escape, text_lines, Layout, RenderSource, Renderer};
use crate::Error;

const PAGE_STYLE: &str = "width:816px;box-sizing:border-box;padding:48px 56px;background:#fff;color:#222;font-family:Georgia,'Times New Roman',serif;font-size:13px;line-height:1.45";
const NAME_STYLE: &str = "margin:0;font-size:28px;letter-spacing:0.5px";
const HEADLINE_STYLE: &str = "margin:4px 0 0 0;font-size:15px;color:#444";
const CONTACT_STYLE: &str = "margin:4px 0 0 0;font-size:12px;color:#555";
const SECTION_STYLE: &str = "margin:18px 0 6px 0;padding-bottom:2px;border-bottom:1px solid #333;font-size:13px;text-transform:uppercase;letter-spacing:1px";
const LIST_STYLE: &str = "margin:4px 0 0 0;padding-left:20px";
const PARA_STYLE: &str = "margin:4px 0";
const MUTED_STYLE: &str = "color:#555;font-weight:normal";

pub struct HtmlRenderer {
    pub layout: Layout,
}

impl Renderer for HtmlRenderer {
    fn render(&self, source: &RenderSource<'_>) -> Result<Vec<u8>, Error> {
        let mut out = String::new();
        out.push_str(&format!("<div style=\"{PAGE_STYLE}\">\n"));
        match (source, self.layout) {
            (RenderSource::Raw(raw), _) => render_raw(&mut out, raw),
            (RenderSource::Structured(doc), Layout::Classic) => render_classic(&mut out, doc),
            (RenderSource::Structured(doc), Layout::Modern) => render_modern(&mut out, doc),
        }
        out.push_str("</div>\n");
        Ok(out.into_bytes())
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

// -- Layouts --------------------------------------------------------------------

fn render_classic(out: &mut String, doc: &ResumeDocument) {
    out.push_str("<header style=\"text-align:center;margin-bottom:12px\">\n");
    render_identity(out, doc);
    if !doc.contact.is_empty() {
        out.push_str(&format!(
            "<p style=\"{CONTACT_STYLE}\">{}</p>\n",
            inline(&doc.contact.join(" · "))
        ));
    }
    out.push_str("</header>\n");
    for section in &doc.sections {
        render_section(out, section);
    }
}

/// Sidebar: contact, skills, education, certifications. Main column:
/// everything else in source order.
fn render_modern(out: &mut String, doc: &ResumeDocument) {
    let in_sidebar = |s: &&Section| {
        matches!(
            s.kind,
            SectionKind::Skills | SectionKind::Education | SectionKind::Certifications
        )
    };

    out.push_str("<div style=\"display:flex;gap:28px;align-items:flex-start\">\n");

    out.push_str(
        "<aside style=\"width:220px;flex-shrink:0;padding-right:16px;border-right:1px solid #ddd\">\n",
    );
    if !doc.contact.is_empty() {
        out.push_str(&format!("<h2 style=\"{SECTION_STYLE}\">Contact</h2>\n"));
        out.push_str(&format!("<ul style=\"{LIST_STYLE};list-style:none;padding-left:0\">\n"));
        for item in &doc.contact {
            out.push_str(&format!("<li>{}</li>\n", inline(item)));
        }
        out.push_str("</ul>\n");
    }
    for section in doc.sections.iter().filter(in_sidebar) {
        render_section(out, section);
    }
    out.push_str("</aside>\n");

    out.push_str("<main style=\"flex:1;min-width:0\">\n");
    out.push_str("<header style=\"margin-bottom:8px\">\n");
    render_identity(out, doc);
    out.push_str("</header>\n");
    for section in doc.sections.iter().filter(|s| !in_sidebar(s)) {
        render_section(out, section);
    }
    out.push_str("</main>\n");

    out.push_str("</div>\n");
}

fn render_identity(out: &mut String, doc: &ResumeDocument) {
    if !doc.name.is_empty() {
        out.push_str(&format!("<h1 style=\"{NAME_STYLE}\">{}</h1>\n", inline(&doc.name)));
    }
    if let Some(headline) = &doc.headline {
        out.push_str(&format!("<p style=\"{HEADLINE_STYLE}\">{}</p>\n", inline(headline)));
    }
}

// -- Sections -------------------------------------------------------------------

fn render_section(out: &mut String, section: &Section) {
    out.push_str(&format!("<section data-kind=\"{}\">\n", section.kind.as_str()));
    if !section.title.is_empty() {
        out.push_str(&format!("<h2 style=\"{SECTION_STYLE}\">{}</h2>\n", inline(&section.title)));
    }
    match &section.body {
        SectionBody::Text(text) => render_text(out, text),
        SectionBody::Roles(roles) => {
            for role in roles {
                render_role(out, role);
            }
        }
        SectionBody::Achievements(items) => {
            render_list(out, items.iter().map(|a| match &a.description {
                Some(d) => format!("<strong>{}</strong>: {}", inline(&a.headline), inline(d)),
                None => format!("<strong>{}</strong>", inline(&a.headline)),
            }));
        }
        SectionBody::Items(items) => render_list(out, items.iter().map(|i| inline(i))),
        SectionBody::Education(entries) => render_list(out, entries.iter().map(education_item)),
    }
    out.push_str("</section>\n");
}

fn render_role(out: &mut String, role: &Role) {
    out.push_str("<div style=\"margin-top:10px\">\n");
    out.push_str("<div style=\"display:flex;justify-content:space-between;font-weight:bold\">");
    out.push_str(&format!("<span>{}</span>", inline(&role.title)));
    if let Some(dates) = role.date_label() {
        out.push_str(&format!("<span style=\"{MUTED_STYLE}\">{}</span>", html_escape(&dates)));
    }
    out.push_str("</div>\n");
    if let Some(company) = role.company_label() {
        out.push_str(&format!("<div style=\"font-style:italic\">{}</div>\n", inline(&company)));
    }
    render_list(out, role.bullets.iter().map(|b| inline(b)));
    out.push_str("</div>\n");
}

fn education_item(entry: &EducationEntry) -> String {
    let mut parts = Vec::new();
    if let Some(degree) = &entry.degree {
        parts.push(format!("<strong>{}</strong>", inline(degree)));
    }
    if let Some(institution) = &entry.institution {
        parts.push(inline(institution));
    }
    let mut item = parts.join(", ");
    if let Some(details) = &entry.details {
        if !item.is_empty() {
            item.push(' ');
        }
        item.push_str(&format!("<span style=\"{MUTED_STYLE}\">{}</span>", inline(details)));
    }
    item
}

/// Paragraphs, with consecutive bullet lines gathered into one list.
fn render_text(out: &mut String, text: &str) {
    let mut pending: Vec<String> = Vec::new();
    for (bullet, line) in text_lines(text) {
        if bullet {
            pending.push(inline(line));
            continue;
        }
        render_list(out, pending.drain(..));
        out.push_str(&format!("<p style=\"{PARA_STYLE}\">{}</p>\n", inline(line)));
    }
    render_list(out, pending.drain(..));
}

fn render_list(out: &mut String, items: impl Iterator<Item = String>) {
    let mut items = items.peekable();
    if items.peek().is_none() {
        return;
    }
    out.push_str(&format!("<ul style=\"{LIST_STYLE}\">\n"));
    for item in items {
        out.push_str(&format!("<li>{item}</li>\n"));
    }
    out.push_str("</ul>\n");
}

// -- Raw fallback ---------------------------------------------------------------

fn render_raw(out: &mut String, raw: &RawDocument) {
    let mut pending: Vec<String> = Vec::new();
    for line in raw.content() {
        if line.kind == RawKind::Bullet {
            pending.push(inline(&line.text));
            continue;
        }
        render_list(out, pending.drain(..));
        let text = inline(&line.text);
        let html = match line.kind {
            RawKind::Name => format!("<h1 style=\"{NAME_STYLE};text-align:center\">{text}</h1>"),
            RawKind::Contact => {
                format!("<p style=\"{CONTACT_STYLE};text-align:center\">{text}</p>")
            }
            RawKind::Header => format!("<h2 style=\"{SECTION_STYLE}\">{text}</h2>"),
            RawKind::Date => {
                format!("<p style=\"{PARA_STYLE};{MUTED_STYLE};text-align:right\">{text}</p>")
            }
            RawKind::Blank | RawKind::Bullet | RawKind::Text => {
                format!("<p style=\"{PARA_STYLE}\">{text}</p>")
            }
        };
        out.push_str(&html);
        out.push('\n');
    }
    render_list(out, pending.drain(..));
}

/// Escaped text with emphasis spans as `<strong>`.
fn inline(text: &str) -> String {
    emphasis::tokenize(text)
        .into_iter()
        .map(|span| {
            if span.strong {
                format!("<strong>{}</strong>", html_escape(span.text))
            } else {
                html_escape(span.text)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;

    const RESUME: &str = "\
Jane Doe
Senior Product Manager
jane@x.com | (555) 123-4567

SUMMARY
Product leader <b>shipping</b> fintech.

EXPERIENCE
Senior Product Manager
Acme Corp | Austin, TX | Jan 2021 – Present
• Grew revenue by **35%**
• Shipped X & Y

SKILLS
Roadmapping, SQL

EDUCATION
MBA, Stanford University, 2015
";

    fn render(layout: Layout, text: &str) -> String {
        let prepared = Pipeline::default().prepare(text);
        let bytes = HtmlRenderer { layout }.render(&prepared.source()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn emphasis_becomes_strong() {
        let html = render(Layout::Classic, RESUME);
        assert!(html.contains("Grew revenue by <strong>35%</strong>"));
        assert!(!html.contains("**"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = render(Layout::Classic, RESUME);
        assert!(html.contains("Product leader &lt;b&gt;shipping&lt;/b&gt; fintech."));
        assert!(html.contains("Shipped X &amp; Y"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn layouts_share_content() {
        let classic = render(Layout::Classic, RESUME);
        let modern = render(Layout::Modern, RESUME);
        assert_eq!(classic.matches("<li>").count(), modern.matches("<li>").count() - 2);
        for needle in [
            "Jane Doe",
            "Acme Corp · Austin, TX",
            "Roadmapping",
            "Stanford University",
        ] {
            assert!(classic.contains(needle), "{needle}");
            assert!(modern.contains(needle), "{needle}");
        }
        assert!(modern.contains("<aside"));
        assert!(!classic.contains("<aside"));
    }

    #[test]
    fn every_list_unit_is_an_item() {
        let html = render(Layout::Classic, RESUME);
        // two role bullets, two skills, one education entry
        assert_eq!(html.matches("<li>").count(), 5);
    }

    #[test]
    fn raw_fallback_keeps_every_line() {
        let text = "Jane Doe\nsome prose here\n• one\n• two **bold**\ntrailing";
        let html = render(Layout::Modern, text);
        for needle in [
            "Jane Doe",
            "some prose here",
            "<li>one</li>",
            "two <strong>bold</strong>",
            "trailing",
        ] {
            assert!(html.contains(needle), "{needle}");
        }
    }

    #[test]
    fn rendering_is_byte_identical() {
        assert_eq!(render(Layout::Modern, RESUME), render(Layout::Modern, RESUME));
    }

    #[test]
    fn fixed_page_width_inline_styles() {
        let html = render(Layout::Classic, RESUME);
        assert!(html.starts_with("<div style=\"width:816px"));
        assert!(!html.contains("<style"));
        assert!(!html.contains("class="));
    }
}
