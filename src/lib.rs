//! cvforge — recover structure from flattened résumé text and render it.
//!
//! ```
//! let doc = cvforge::parse(&[
//!     "Jane Doe",
//!     "EXPERIENCE",
//!     "Senior Product Manager",
//!     "Acme Corp | Austin, TX | Jan 2021 – Present",
//!     "• Shipped X",
//! ]);
//! let role = doc.roles().next().unwrap();
//! assert_eq!(role.company.as_deref(), Some("Acme Corp"));
//! ```

mod assemble;
pub mod classify;
pub mod confidence;
pub mod emphasis;
mod error;
pub mod fallback;
pub mod lexicon;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod roles;
pub mod sections;
pub mod segment;

use std::sync::LazyLock;

pub use classify::LineClassifier;
pub use confidence::{Confidence, FallbackReason, GatePolicy};
pub use error::Error;
pub use lexicon::Lexicon;
pub use model::ResumeDocument;
pub use pipeline::{Mode, Pipeline, Prepared, Revision};
pub use render::{create_renderer, Layout, RenderSource, Renderer};

static DEFAULT_CLASSIFIER: LazyLock<LineClassifier> = LazyLock::new(LineClassifier::default);

/// Parse untrimmed lines with the built-in lexicon.
pub fn parse<S: AsRef<str>>(lines: &[S]) -> ResumeDocument {
    DEFAULT_CLASSIFIER.parse(lines)
}

/// Split, parse and gate `text` with the default pipeline.
pub fn prepare(text: &str) -> Prepared {
    Pipeline::default().prepare(text)
}
