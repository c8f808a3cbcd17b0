use folio::domain::models::{LayoutElement, Line, PartialLayout, RequestDocument};
use folio::services::merge;
use proptest::prelude::*;

fn document(texts: Vec<String>) -> RequestDocument {
    RequestDocument::new(
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                LayoutElement::new(format!("1/{}", i + 1), vec![Line::new(text)])
                    .with_attribute("order", i)
            })
            .collect(),
    )
}

fn updation() -> impl Strategy<Value = Vec<PartialLayout>> {
    prop::collection::vec(
        (0usize..12, "[a-z ]{0,12}")
            .prop_map(|(n, text)| PartialLayout::new(format!("1/{n}"), vec![Line::new(text)])),
        0..10,
    )
}

proptest! {
    /// Property: merge never adds, drops or reorders layouts
    #[test]
    fn prop_merge_preserves_identity_and_order(
        texts in prop::collection::vec("[a-z]{1,8}", 0..8),
        updation in updation()
    ) {
        let doc = document(texts);
        let merged = merge(&doc, &updation);

        prop_assert_eq!(merged.ids(), doc.ids());
        for (before, after) in doc.layouts.iter().zip(&merged.layouts) {
            prop_assert_eq!(&before.kind, &after.kind);
            prop_assert_eq!(&before.attributes, &after.attributes);
        }
    }

    /// Property: layouts not named by the updation carry forward unchanged
    #[test]
    fn prop_unmentioned_layouts_unchanged(
        texts in prop::collection::vec("[a-z]{1,8}", 0..8),
        updation in updation()
    ) {
        let doc = document(texts);
        let merged = merge(&doc, &updation);

        for (before, after) in doc.layouts.iter().zip(&merged.layouts) {
            let mentioned = updation.iter().any(|p| p.id.as_deref() == Some(before.id.as_str()));
            if !mentioned {
                prop_assert_eq!(before, after);
            }
        }
    }

    /// Property: applying the same updation twice changes nothing more
    #[test]
    fn prop_merge_is_idempotent(
        texts in prop::collection::vec("[a-z]{1,8}", 0..8),
        updation in updation()
    ) {
        let once = merge(&document(texts), &updation);
        let twice = merge(&once, &updation);
        prop_assert_eq!(once, twice);
    }
}
