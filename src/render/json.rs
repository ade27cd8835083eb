//! JSON renderer — the parsed model for tooling integration.
//!
//! Serializes whichever source the gate selected: the structured document,
//! or the labelled raw lines. Emphasis markers are stripped from every
//! string, as in the other artifacts.

use serde::Serialize;
use serde_json::Value;

use crate::emphasis;
use crate::fallback::RawDocument;
use crate::model::ResumeDocument;
use crate::render::{RenderSource, Renderer};
use crate::Error;

pub struct ModelRenderer;

#[derive(Serialize)]
#[serde(tag = "mode", content = "document", rename_all = "snake_case")]
enum Dump<'a> {
    Structured(&'a ResumeDocument),
    Raw(&'a RawDocument),
}

impl Renderer for ModelRenderer {
    fn render(&self, source: &RenderSource<'_>) -> Result<Vec<u8>, Error> {
        let dump = match *source {
            RenderSource::Structured(doc) => Dump::Structured(doc),
            RenderSource::Raw(raw) => Dump::Raw(raw),
        };
        let mut value = serde_json::to_value(&dump)?;
        strip_markers(&mut value);
        let mut out = serde_json::to_vec_pretty(&value)?;
        out.push(b'\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn strip_markers(value: &mut Value) {
    match value {
        Value::String(text) if emphasis::has_emphasis(text.as_str()) => {
            *text = emphasis::strip(text.as_str());
        }
        Value::Array(items) => items.iter_mut().for_each(strip_markers),
        Value::Object(fields) => fields.values_mut().for_each(strip_markers),
        _ => {}
    }
}
