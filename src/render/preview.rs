//! Structured preview — an in-memory tree for on-screen display.
//!
//! Built from the same [`RenderSource`] as the file renderers, so the preview
//! and the exported artifact never differ in content.

use serde::Serialize;

use crate::emphasis;
use crate::fallback::{RawDocument, RawKind};
use crate::model::{Achievement, EducationEntry, ResumeDocument, Role, Section, SectionBody};
use crate::pipeline::Revision;
use crate::render::{text_lines, RenderSource, Renderer};
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewTree {
    pub mode: PreviewMode,
    pub root: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    Structured,
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Document,
    Name,
    Headline,
    Contact,
    Section,
    Role,
    Company,
    /// Any list unit
    Bullet,
    Paragraph,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub role: NodeRole,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Inline>,
    /// Secondary text shown beside the spans (dates, details)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Plain(String),
    Strong(String),
}

/// Before/after trees for a rewritten résumé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub before: PreviewTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<PreviewTree>,
}

impl Node {
    fn new(role: NodeRole, text: &str) -> Self {
        Node {
            role,
            spans: spans(text),
            meta: None,
            children: Vec::new(),
        }
    }

    fn with_meta(mut self, meta: Option<String>) -> Self {
        self.meta = meta;
        self
    }

    fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Spans and meta flattened to plain text.
    pub fn text(&self) -> String {
        let mut out: String = self
            .spans
            .iter()
            .map(|s| match s {
                Inline::Plain(t) | Inline::Strong(t) => t.as_str(),
            })
            .collect();
        if let Some(meta) = &self.meta {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(meta);
        }
        out
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

impl PreviewTree {
    pub fn bullet_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |n| {
            if n.role == NodeRole::Bullet {
                count += 1;
            }
        });
        count
    }

    /// Every node's text, one per line, depth-first.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        self.root.walk(&mut |n| {
            let text = n.text();
            if !text.is_empty() {
                lines.push(text);
            }
        });
        lines.join("\n")
    }
}

/// Build the preview tree for either render path.
pub fn build(source: &RenderSource<'_>) -> PreviewTree {
    match source {
        RenderSource::Structured(doc) => PreviewTree {
            mode: PreviewMode::Structured,
            root: document_node(doc),
        },
        RenderSource::Raw(raw) => PreviewTree {
            mode: PreviewMode::Raw,
            root: raw_node(raw),
        },
    }
}

/// Preview both versions of a revision, each from its own render path.
pub fn compare(revision: &Revision) -> Comparison {
    Comparison {
        before: build(&revision.original.source()),
        after: revision.revised.as_ref().map(|r| build(&r.source())),
    }
}

/// Emphasis-aware inline spans.
pub fn spans(text: &str) -> Vec<Inline> {
    emphasis::tokenize(text)
        .into_iter()
        .map(|span| {
            if span.strong {
                Inline::Strong(span.text.to_string())
            } else {
                Inline::Plain(span.text.to_string())
            }
        })
        .collect()
}

fn document_node(doc: &ResumeDocument) -> Node {
    let mut children = Vec::new();
    if !doc.name.is_empty() {
        children.push(Node::new(NodeRole::Name, &doc.name));
    }
    if let Some(headline) = &doc.headline {
        children.push(Node::new(NodeRole::Headline, headline));
    }
    if !doc.contact.is_empty() {
        children.push(Node::new(NodeRole::Contact, &doc.contact.join(" · ")));
    }
    children.extend(doc.sections.iter().map(section_node));
    Node::new(NodeRole::Document, "").with_children(children)
}

fn section_node(section: &Section) -> Node {
    let children = match &section.body {
        SectionBody::Text(text) => text_lines(text)
            .map(|(bullet, line)| {
                Node::new(if bullet { NodeRole::Bullet } else { NodeRole::Paragraph }, line)
            })
            .collect(),
        SectionBody::Roles(roles) => roles.iter().map(role_node).collect(),
        SectionBody::Achievements(items) => items.iter().map(achievement_node).collect(),
        SectionBody::Items(items) => items.iter().map(|i| Node::new(NodeRole::Bullet, i)).collect(),
        SectionBody::Education(entries) => entries.iter().map(education_node).collect(),
    };
    Node::new(NodeRole::Section, &section.title).with_children(children)
}

fn role_node(role: &Role) -> Node {
    let mut children = Vec::new();
    if let Some(company) = role.company_label() {
        children.push(Node::new(NodeRole::Company, &company));
    }
    children.extend(role.bullets.iter().map(|b| Node::new(NodeRole::Bullet, b)));
    Node::new(NodeRole::Role, &role.title)
        .with_meta(role.date_label())
        .with_children(children)
}

fn achievement_node(item: &Achievement) -> Node {
    let mut node = Node::new(NodeRole::Bullet, "");
    node.spans.push(Inline::Strong(emphasis::strip(&item.headline)));
    if let Some(description) = &item.description {
        node.spans.push(Inline::Plain(": ".to_string()));
        node.spans.extend(spans(description));
    }
    node
}

fn education_node(entry: &EducationEntry) -> Node {
    let mut node = Node::new(NodeRole::Bullet, "");
    if let Some(degree) = &entry.degree {
        node.spans.push(Inline::Strong(emphasis::strip(degree)));
    }
    if let Some(institution) = &entry.institution {
        if !node.spans.is_empty() {
            node.spans.push(Inline::Plain(", ".to_string()));
        }
        node.spans.extend(spans(institution));
    }
    node.with_meta(entry.details.clone())
}

fn raw_node(raw: &RawDocument) -> Node {
    let children = raw
        .content()
        .map(|line| {
            let role = match line.kind {
                RawKind::Name => NodeRole::Name,
                RawKind::Contact => NodeRole::Contact,
                RawKind::Header => NodeRole::Section,
                RawKind::Bullet => NodeRole::Bullet,
                RawKind::Date => NodeRole::Date,
                RawKind::Blank | RawKind::Text => NodeRole::Paragraph,
            };
            Node::new(role, &line.text)
        })
        .collect();
    Node::new(NodeRole::Document, "").with_children(children)
}

/// Serializes the preview tree as pretty JSON.
pub struct PreviewRenderer;

impl Renderer for PreviewRenderer {
    fn render(&self, source: &RenderSource<'_>) -> Result<Vec<u8>, Error> {
        let mut out = serde_json::to_vec_pretty(&build(source))?;
        out.push(b'\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::LineClassifier;

    const RESUME: &str = "\
Jane Doe
Senior Product Manager
jane@x.com | (555) 123-4567

EXPERIENCE
Senior Product Manager
Acme Corp | Austin, TX | Jan 2021 – Present
• Grew revenue by **35%**
• Shipped X

SKILLS
Roadmapping, SQL
";

    #[test]
    fn mirrors_document_structure() {
        let prepared = Pipeline::default().prepare(RESUME);
        let tree = build(&prepared.source());
        assert_eq!(tree.mode, PreviewMode::Structured);
        let roles: Vec<_> = tree.root.children.iter().map(|n| n.role).collect();
        assert_eq!(
            roles,
            vec![
                NodeRole::Name,
                NodeRole::Headline,
                NodeRole::Contact,
                NodeRole::Section,
                NodeRole::Section
            ]
        );
        let role = &tree.root.children[3].children[0];
        assert_eq!(role.meta.as_deref(), Some("Jan 2021 – Present"));
        assert_eq!(role.children[0].text(), "Acme Corp · Austin, TX");
        assert_eq!(
            role.children[1].spans,
            vec![Inline::Plain("Grew revenue by ".into()), Inline::Strong("35%".into())]
        );
        assert_eq!(tree.bullet_count(), 4);
    }

    #[test]
    fn raw_preview_keeps_every_line() {
        let lines = ["Jane Doe", "random words", "• a **b** c", "****"];
        let raw = LineClassifier::default().classify_raw(&lines);
        let tree = build(&RenderSource::Raw(&raw));
        assert_eq!(tree.mode, PreviewMode::Raw);
        assert_eq!(tree.plain_text(), "Jane Doe\nrandom words\na b c\n****");
        assert_eq!(tree.bullet_count(), 1);
    }

    #[test]
    fn preview_is_structurally_identical_across_builds() {
        let prepared = Pipeline::default().prepare(RESUME);
        assert_eq!(build(&prepared.source()), build(&prepared.source()));
    }

    #[test]
    fn compare_pairs_both_versions() {
        let revision = Pipeline::default().revise("just text", Some(RESUME));
        let comparison = compare(&revision);
        assert_eq!(comparison.before.mode, PreviewMode::Raw);
        assert_eq!(comparison.after.map(|t| t.mode), Some(PreviewMode::Structured));
    }

    #[test]
    fn renders_json() {
        let prepared = Pipeline::default().prepare(RESUME);
        let bytes = PreviewRenderer.render(&prepared.source()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["mode"], "structured");
        assert!(!String::from_utf8(bytes).unwrap().contains("**"));
    }
}
