//! Renderer module — trait-based format dispatch.

pub mod docx;
pub mod html;
pub mod json;
pub mod preview;

use std::str::FromStr;

use crate::classify::strip_bullet;
use crate::fallback::RawDocument;
use crate::model::ResumeDocument;
use crate::Error;

/// What a renderer draws: the structured model, or raw lines after the
/// confidence gate rejected it.
#[derive(Debug, Clone, Copy)]
pub enum RenderSource<'a> {
    Structured(&'a ResumeDocument),
    Raw(&'a RawDocument),
}

/// Trait for rendering a résumé into a specific output format.
pub trait Renderer {
    fn render(&self, source: &RenderSource<'_>) -> Result<Vec<u8>, Error>;
    fn file_extension(&self) -> &str;

    /// Artifact name, `optimized-resume.<ext>`.
    fn file_name(&self) -> String {
        format!("optimized-resume.{}", self.file_extension())
    }
}

/// HTML page arrangement. Content is identical in both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Single column, centered header
    #[default]
    Classic,
    /// Sidebar plus main column
    Modern,
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "classic" => Ok(Layout::Classic),
            "modern" => Ok(Layout::Modern),
            _ => Err(Error::UnknownLayout(s.to_string())),
        }
    }
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str, layout: Layout) -> Result<Box<dyn Renderer>, Error> {
    match format {
        "docx" => Ok(Box::new(docx::DocxRenderer)),
        "html" => Ok(Box::new(html::HtmlRenderer { layout })),
        "preview" => Ok(Box::new(preview::PreviewRenderer)),
        "model" | "json" => Ok(Box::new(json::ModelRenderer)),
        _ => Err(Error::UnknownFormat(format.to_string())),
    }
}

/// Escape text for HTML element content and attribute values.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Lines of a text body, each flagged as a bullet (glyph stripped) or not.
pub(crate) fn text_lines(text: &str) -> impl Iterator<Item = (bool, &str)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| match strip_bullet(l) {
            stripped if stripped.len() < l.len() && !stripped.is_empty() => (true, stripped),
            _ => (false, l),
        })
}
