//! Quality grades, the step schedule, and the per-chunk correction state.
//!
//! The step schedule maps each grade to a budget delta. When a round's grade
//! is at least as good as the current one, the deltas of every grade between
//! them (old grade inclusive, new grade exclusive) are granted back to the
//! budget. Every round then costs one step, so the budget is always exhausted
//! eventually.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::errors::CorrectionError;

/// Quality grade reported by the oracle, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Output is unusable
    Invalid,
    /// Many errors remain
    Poor,
    /// Some errors remain
    Fair,
    /// Minor errors remain
    Good,
    /// Nothing left to correct
    Perfect,
}

impl Quality {
    /// All grades, worst to best.
    pub const ALL: [Self; 5] = [
        Self::Invalid,
        Self::Poor,
        Self::Fair,
        Self::Good,
        Self::Perfect,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Perfect => "perfect",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "invalid" => Some(Self::Invalid),
            "poor" => Some(Self::Poor),
            "fair" => Some(Self::Fair),
            "good" => Some(Self::Good),
            "perfect" => Some(Self::Perfect),
            _ => None,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Oracles are loose about casing, so accept any.
impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).ok_or_else(|| {
            serde::de::Error::unknown_variant(
                &raw,
                &["invalid", "poor", "fair", "good", "perfect"],
            )
        })
    }
}

/// Ordered reference sequence of grades and their budget deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSchedule {
    entries: Vec<(Quality, i32)>,
}

impl Default for StepSchedule {
    fn default() -> Self {
        Self {
            entries: vec![
                (Quality::Invalid, 5),
                (Quality::Poor, 4),
                (Quality::Fair, 3),
                (Quality::Good, 0),
                (Quality::Perfect, 0),
            ],
        }
    }
}

impl StepSchedule {
    /// Build a schedule from entries listed worst to best.
    ///
    /// Grades must be strictly ascending and deltas non-negative.
    pub fn new(entries: Vec<(Quality, i32)>) -> Result<Self, CorrectionError> {
        if let Some((quality, delta)) = entries.iter().find(|(_, delta)| *delta < 0) {
            return Err(CorrectionError::InvalidSchedule(format!(
                "delta for '{quality}' is negative ({delta})"
            )));
        }

        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(CorrectionError::InvalidSchedule(format!(
                "'{}' is listed before '{}'; grades must run worst to best",
                pair[0].0, pair[1].0
            )));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(Quality, i32)] {
        &self.entries
    }

    /// Budget delta earned by moving from `old` to `new`.
    ///
    /// Returns `None` when `new` does not come at or after `old` in the
    /// schedule, which is the regression case: no delta, no grade change.
    pub fn transition(&self, old: Quality, new: Quality) -> Option<i32> {
        let mut found_begin = false;
        let mut found_end = false;
        let mut increment = 0;

        for &(quality, delta) in &self.entries {
            if quality == old {
                found_begin = true;
            }
            if quality == new {
                found_end = true;
                break;
            }
            if found_begin {
                increment += delta;
            }
        }

        (found_begin && found_end).then_some(increment)
    }
}

/// Per-chunk correction state.
///
/// This is a plain value: each round produces a new state from the previous
/// one, so replaying journal records and running live rounds share one code
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorrectionState {
    /// Grade of the best accepted round so far
    pub quality: Option<Quality>,

    /// Remaining round budget, never negative
    pub remain_steps: i32,

    /// Index the next step record will be written under
    pub next_index: u32,
}

impl CorrectionState {
    /// Fresh state for a chunk with no journal.
    pub const fn new(initial_budget: i32) -> Self {
        Self {
            quality: None,
            remain_steps: initial_budget,
            next_index: 1,
        }
    }

    /// Fold one graded round into the state.
    #[must_use]
    pub fn report(self, schedule: &StepSchedule, graded: Quality) -> Self {
        let mut next = self;

        match self.quality {
            None => next.quality = Some(graded),
            Some(current) => {
                if let Some(increment) = schedule.transition(current, graded) {
                    next.remain_steps += increment;
                    next.quality = Some(graded);
                }
            }
        }

        next.remain_steps = (next.remain_steps - 1).max(0);
        next
    }

    /// Record that step `index` has been persisted.
    ///
    /// Saturates at `u32::MAX`; journals never hold a record at that index.
    #[must_use]
    pub const fn advanced_past(self, index: u32) -> Self {
        Self {
            next_index: index.saturating_add(1),
            ..self
        }
    }

    /// Loop guard: budget left and not yet perfect.
    pub fn should_continue(&self) -> bool {
        self.remain_steps > 0 && self.quality != Some(Quality::Perfect)
    }
}
