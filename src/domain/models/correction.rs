//! Oracle responses, step records, and the fixed per-round oracle parameters.

use serde::{Deserialize, Serialize};

use super::layout::{Line, RequestDocument};
use super::quality::Quality;

/// Grade block of a correction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    /// Reported grade; a missing grade counts as perfect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,

    /// Oracle's hint that errors remain beyond what it corrected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remain: Option<bool>,
}

impl Overview {
    /// Overview carrying only a grade.
    pub const fn graded(quality: Quality) -> Self {
        Self {
            quality: Some(quality),
            remain: None,
        }
    }

    pub fn grade(&self) -> Quality {
        self.quality.unwrap_or(Quality::Perfect)
    }
}

/// Corrected content for one layout, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialLayout {
    /// Target layout id; entries without one are ignored on merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Replacement content
    #[serde(default)]
    pub content: Vec<Line>,
}

impl PartialLayout {
    pub fn new(id: impl Into<String>, content: Vec<Line>) -> Self {
        Self {
            id: Some(id.into()),
            content,
        }
    }
}

/// Decoded oracle output for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResponse {
    /// Grade for this round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<Overview>,

    /// Partial layouts to merge
    #[serde(default)]
    pub updation: Vec<PartialLayout>,
}

impl CorrectionResponse {
    /// Response with a grade and the given updates.
    pub const fn new(quality: Quality, updation: Vec<PartialLayout>) -> Self {
        Self {
            overview: Some(Overview::graded(quality)),
            updation,
        }
    }

    /// Grade used for budgeting. Absent overview means nothing to fix.
    pub fn grade(&self) -> Quality {
        self.overview.as_ref().map_or(Quality::Perfect, Overview::grade)
    }
}

/// Persisted snapshot of one correction round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Overview returned for the round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<Overview>,

    /// Updates returned for the round, omitted when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updation: Option<Vec<PartialLayout>>,

    /// Document sent to the oracle for the round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestDocument>,
}

impl StepRecord {
    /// Snapshot a round from the oracle response and the document it was given.
    pub fn new(response: &CorrectionResponse, request: &RequestDocument) -> Self {
        Self {
            overview: response.overview.clone(),
            updation: (!response.updation.is_empty()).then(|| response.updation.clone()),
            request: Some(request.clone()),
        }
    }

    pub fn grade(&self) -> Quality {
        self.overview.as_ref().map_or(Quality::Perfect, Overview::grade)
    }

    pub fn updation(&self) -> &[PartialLayout] {
        self.updation.as_deref().unwrap_or_default()
    }
}

/// Fixed parameters passed to the oracle alongside each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionParams {
    /// Hint for how many layouts the oracle should consider at once
    pub layouts_count: usize,

    /// Whether the chunk holds footnotes rather than body text
    pub is_footnote: bool,

    /// Marker glyphs the oracle may use for disambiguation
    pub marks: Vec<String>,
}

/// First `count` circled-number glyphs: ①, ②, ③, ...
///
/// Unicode has circled numbers up to 50; beyond that a parenthesised
/// number is used.
pub fn circled_marks(count: usize) -> Vec<String> {
    (1..=count).map(circled_number).collect()
}

fn circled_number(n: usize) -> String {
    let code_point = match n {
        1..=20 => 0x2460 + (n - 1),
        21..=35 => 0x3251 + (n - 21),
        36..=50 => 0x32B1 + (n - 36),
        _ => return format!("({n})"),
    };

    u32::try_from(code_point)
        .ok()
        .and_then(char::from_u32)
        .map_or_else(|| format!("({n})"), |c| c.to_string())
}
