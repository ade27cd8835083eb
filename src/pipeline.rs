//! Text in, render-ready documents out: split, parse, gate.

use std::str::FromStr;
use tracing::{debug, info};

use crate::classify::LineClassifier;
use crate::confidence::{source_bullet_count, Confidence, GatePolicy};
use crate::fallback::RawDocument;
use crate::model::ResumeDocument;
use crate::render::RenderSource;
use crate::Error;

/// Which path the renderers take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Follow the confidence gate
    #[default]
    Auto,
    Structured,
    Raw,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "auto" => Ok(Mode::Auto),
            "structured" => Ok(Mode::Structured),
            "raw" => Ok(Mode::Raw),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// One parsed input with both render paths available.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub lines: Vec<String>,
    pub document: ResumeDocument,
    pub raw: RawDocument,
    pub confidence: Confidence,
    pub mode: Mode,
}

impl Prepared {
    /// Whether renderers get the structured model.
    pub fn is_structured(&self) -> bool {
        match self.mode {
            Mode::Auto => self.confidence.is_structured(),
            Mode::Structured => true,
            Mode::Raw => false,
        }
    }

    pub fn source(&self) -> RenderSource<'_> {
        if self.is_structured() {
            RenderSource::Structured(&self.document)
        } else {
            RenderSource::Raw(&self.raw)
        }
    }
}

/// The original résumé and, when available, its rewritten version. Each is
/// parsed on its own; nothing carries over between them.
#[derive(Debug, Clone)]
pub struct Revision {
    pub original: Prepared,
    pub revised: Option<Prepared>,
}

impl Revision {
    /// The version to export: the rewrite when present.
    pub fn latest(&self) -> &Prepared {
        self.revised.as_ref().unwrap_or(&self.original)
    }
}

/// Classifier, gate policy and mode override bundled for repeated use.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub classifier: LineClassifier,
    pub policy: GatePolicy,
    pub mode: Mode,
}

impl Pipeline {
    pub fn new(classifier: LineClassifier) -> Self {
        Pipeline {
            classifier,
            ..Pipeline::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn prepare(&self, text: &str) -> Prepared {
        let lines = split_lines(text);
        let document = self.classifier.parse(&lines);
        let raw = self.classifier.classify_raw(&lines);
        let bullets = source_bullet_count(&self.classifier, &lines);
        let confidence = self.policy.assess(&document, bullets);
        if let Confidence::RawFallback(reason) = &confidence {
            info!(%reason, "using raw fallback rendering");
        }
        debug!(lines = lines.len(), bullets, mode = ?self.mode, "prepared input");
        Prepared {
            lines,
            document,
            raw,
            confidence,
            mode: self.mode,
        }
    }

    pub fn revise(&self, original: &str, revised: Option<&str>) -> Revision {
        Revision {
            original: self.prepare(original),
            revised: revised.map(|text| self.prepare(text)),
        }
    }
}

/// Split on line breaks, keeping blank lines and leading whitespace.
pub fn split_lines(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .map(str::to_string)
        .collect()
}
