//! Sparse, id-keyed patching of a request document.
//!
//! The oracle only returns the layouts it changed. Applying them by identity,
//! never by position, means a response that drops, reorders or invents
//! layouts cannot reshape the document.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::models::{PartialLayout, RequestDocument};

/// Apply `updation` onto `previous`.
///
/// - known ids get their content replaced wholesale; `kind` and attributes stay
/// - unknown ids and entries without an id are ignored
/// - ids not mentioned carry forward unchanged
/// - order is exactly that of `previous`
///
/// When an id appears more than once in `updation`, the last entry wins.
pub fn merge(previous: &RequestDocument, updation: &[PartialLayout]) -> RequestDocument {
    let mut layouts = previous.layouts.clone();
    let positions: HashMap<String, usize> = layouts
        .iter()
        .enumerate()
        .map(|(position, layout)| (layout.id.clone(), position))
        .collect();

    let mut ignored = 0usize;
    for partial in updation {
        match partial.id.as_deref().and_then(|id| positions.get(id)) {
            Some(&position) => layouts[position].content.clone_from(&partial.content),
            None => ignored += 1,
        }
    }

    if ignored > 0 {
        debug!(
            ignored,
            applied = updation.len() - ignored,
            "ignored updation entries with unknown or missing ids"
        );
    }

    RequestDocument::new(layouts)
}
