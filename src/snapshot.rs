use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FieldState;


// Field name -> values submitted under that name, captured when a form becomes tracked and
// replaced only on `mark_clean`.
//
// Several controls may share a name (radio groups, `CheckboxSelectMultiple`, `<select multiple>`).
// Each contributes its submitted values to the name's list. Checkable groups are kept sorted, so
// the order in which members are visited is irrelevant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    values: BTreeMap<String, Vec<String>>,
}

impl FieldSnapshot {
    pub fn new() -> Self { Self::default() }

    pub fn capture<'a>(fields: impl IntoIterator<Item = &'a FieldState>) -> Self {
        let mut snapshot = FieldSnapshot::new();
        for field in fields {
            snapshot.record(field);
        }
        snapshot
    }

    pub fn record(&mut self, field: &FieldState) {
        if !field.is_trackable() {
            return;
        }
        // The entry is created even for an unchecked box, so that the group is known.
        let values = self.values.entry(field.name.clone()).or_default();
        values.extend(field.submitted_values());
        if field.kind.is_checkable() {
            values.sort();
        }
    }

    // Adds fields that were not known before (e.g. a row inserted at runtime). Existing baselines
    // are kept.
    pub fn extend(&mut self, other: FieldSnapshot) {
        for (name, values) in other.values {
            self.values.entry(name).or_insert(values);
        }
    }

    // Replaces the baseline of the given fields, for values the page itself changed (e.g. the
    // formset row counter).
    pub fn rebase(&mut self, other: FieldSnapshot) {
        self.values.extend(other.values);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> { self.values.get(name).map(Vec::as_slice) }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    // Names whose values differ between the two snapshots. A field present on one side only
    // counts as changed unless it is blank there: a blank field that appears or disappears does
    // not lose anything.
    pub fn changed_fields<'a>(&'a self, live: &'a FieldSnapshot) -> Vec<&'a str> {
        let mut changed = Vec::new();
        for (name, values) in &self.values {
            match live.values.get(name) {
                Some(live_values) if live_values != values => changed.push(name.as_str()),
                None if !is_blank(values) => changed.push(name.as_str()),
                _ => {}
            }
        }
        for (name, values) in &live.values {
            if !self.values.contains_key(name) && !is_blank(values) {
                changed.push(name.as_str());
            }
        }
        changed
    }

    pub fn differs_from(&self, live: &FieldSnapshot) -> bool {
        !self.changed_fields(live).is_empty()
    }
}

fn is_blank(values: &[String]) -> bool { values.iter().all(String::is_empty) }


#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    fn radio(name: &str, value: &str, checked: bool) -> FieldState {
        FieldState::new(name, FieldKind::Radio, value).with_checked(checked)
    }

    #[test]
    fn radio_group_order_independent() {
        let a = FieldSnapshot::capture(&[radio("size", "s", false), radio("size", "m", true)]);
        let b = FieldSnapshot::capture(&[radio("size", "m", true), radio("size", "s", false)]);
        assert_eq!(a, b);
        assert_eq!(a.get("size"), Some(["m".to_owned()].as_slice()));

        let none = FieldSnapshot::capture(&[radio("size", "s", false)]);
        assert_eq!(none.get("size"), Some([].as_slice()));
    }

    #[test]
    fn checkbox_group_tracks_every_member() {
        let checkbox = |value: &str, checked: bool| {
            FieldState::new("tags", FieldKind::Checkbox, value).with_checked(checked)
        };
        let base = FieldSnapshot::capture(&[checkbox("a", false), checkbox("b", false)]);
        let live = FieldSnapshot::capture(&[checkbox("a", true), checkbox("b", false)]);
        assert_eq!(base.changed_fields(&live), vec!["tags"]);

        let both = FieldSnapshot::capture(&[checkbox("b", true), checkbox("a", true)]);
        assert_eq!(both.get("tags"), Some(["a".to_owned(), "b".to_owned()].as_slice()));
        assert!(!both.differs_from(&FieldSnapshot::capture(&[
            checkbox("a", true),
            checkbox("b", true)
        ])));
    }

    #[test]
    fn multiple_select_tracks_every_option() {
        let select = |selected: &[&str]| {
            FieldState::new("tags", FieldKind::SelectMultiple, "").with_selected(selected.to_vec())
        };
        let base = FieldSnapshot::capture(&[select(&["1"])]);
        assert!(base.differs_from(&FieldSnapshot::capture(&[select(&["1", "3"])])));
        assert!(base.differs_from(&FieldSnapshot::capture(&[select(&[])])));
        assert!(!base.differs_from(&FieldSnapshot::capture(&[select(&["1"])])));
    }

    #[test]
    fn skips_unnamed_and_action_fields() {
        let snapshot = FieldSnapshot::capture(&[
            FieldState::new("", FieldKind::Text, "x"),
            FieldState::new("save", FieldKind::Submit, "Save"),
            FieldState::new("title", FieldKind::Text, "x"),
        ]);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn blank_fields_appearing_are_not_changes() {
        let base = FieldSnapshot::capture(&[FieldState::new("a", FieldKind::Text, "1")]);
        let live = FieldSnapshot::capture(&[
            FieldState::new("a", FieldKind::Text, "1"),
            FieldState::new("b", FieldKind::Text, ""),
        ]);
        assert!(!base.differs_from(&live));

        let live = FieldSnapshot::capture(&[
            FieldState::new("a", FieldKind::Text, "1"),
            FieldState::new("b", FieldKind::Text, "typed"),
        ]);
        assert_eq!(base.changed_fields(&live), vec!["b"]);
    }

    #[test]
    fn extend_keeps_existing_baseline() {
        let mut base = FieldSnapshot::capture(&[FieldState::new("a", FieldKind::Text, "1")]);
        base.extend(FieldSnapshot::capture(&[
            FieldState::new("a", FieldKind::Text, "2"),
            FieldState::new("b", FieldKind::Text, ""),
        ]));
        assert_eq!(base.get("a"), Some(["1".to_owned()].as_slice()));
        assert_eq!(base.get("b"), Some(["".to_owned()].as_slice()));
    }

    #[test]
    fn rebase_replaces_existing_baseline() {
        let mut base = FieldSnapshot::capture(&[
            FieldState::new("a", FieldKind::Text, "1"),
            FieldState::new("doi-TOTAL_FORMS", FieldKind::Hidden, "0"),
        ]);
        base.rebase(FieldSnapshot::capture(&[FieldState::new(
            "doi-TOTAL_FORMS",
            FieldKind::Hidden,
            "1",
        )]));
        assert_eq!(base.get("a"), Some(["1".to_owned()].as_slice()));
        assert_eq!(base.get("doi-TOTAL_FORMS"), Some(["1".to_owned()].as_slice()));
    }
}
