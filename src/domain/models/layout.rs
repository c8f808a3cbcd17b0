//! Layout elements and the request document that carries them between rounds.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single line of OCR'd text inside a layout element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Line identifier, when the upstream extractor assigned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Text content of the line
    pub text: String,
}

impl Line {
    /// Create an anonymous line.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    /// Create a line with an explicit identifier.
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
        }
    }
}

/// A uniquely identified unit of content (a paragraph, a footnote, a headline).
///
/// `kind` and `attributes` belong to the original extraction and are carried
/// verbatim across merges. Only `content` is ever replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Identifier, unique within a request and stable across rounds
    pub id: String,

    /// Element kind as produced by the sequence stage (`text`, `footnote`, ...)
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Opaque metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    /// Ordered sub-elements
    #[serde(default)]
    pub content: Vec<Line>,
}

fn default_kind() -> String {
    "text".to_string()
}

impl LayoutElement {
    /// Create a `text` element with no attributes.
    pub fn new(id: impl Into<String>, content: Vec<Line>) -> Self {
        Self {
            id: id.into(),
            kind: default_kind(),
            attributes: Map::new(),
            content,
        }
    }

    /// Set the element kind.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// The current best-known state of one chunk, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDocument {
    /// Layout elements in reading order
    #[serde(default)]
    pub layouts: Vec<LayoutElement>,
}

impl RequestDocument {
    /// Wrap a list of layouts.
    pub const fn new(layouts: Vec<LayoutElement>) -> Self {
        Self { layouts }
    }

    /// Layout ids in document order.
    pub fn ids(&self) -> Vec<&str> {
        self.layouts.iter().map(|layout| layout.id.as_str()).collect()
    }

    /// Look up a layout by id.
    pub fn get(&self, id: &str) -> Option<&LayoutElement> {
        self.layouts.iter().find(|layout| layout.id == id)
    }

    /// Number of layouts.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Whether the document has no layouts.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// First id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.layouts.len());
        self.layouts
            .iter()
            .map(|layout| layout.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}
