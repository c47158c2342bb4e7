// Sample data shared by unit tests, integration tests and the browser tests of `formguard_wasm`.

use crate::field::{FieldKind, FieldState};
use crate::formset::{FormsetGroup, Row, reindex_attr};
use crate::snapshot::FieldSnapshot;


pub const SAMPLE_PREFIX: &str = "doi";

// Template fields of a typical inline formset row: a text field, a select, a checkbox, a file
// upload and the deletion flag.
pub fn sample_template() -> Vec<FieldState> {
    let field = |name: &str, kind| {
        FieldState::new(format!("doi-__prefix__-{name}"), kind, "")
            .with_id(format!("id_doi-__prefix__-{name}"))
    };
    vec![
        field("link", FieldKind::Text),
        field("kind", FieldKind::Select),
        field("primary", FieldKind::Checkbox).with_value("on"),
        field("attachment", FieldKind::File),
        field("DELETE", FieldKind::Hidden),
    ]
}

// A persisted row with `link` filled in.
pub fn sample_row_with_data(index: usize, link: &str) -> Row {
    let fields = sample_template()
        .into_iter()
        .map(|mut f| {
            f.name = reindex_attr(SAMPLE_PREFIX, &f.name, index);
            f.id = reindex_attr(SAMPLE_PREFIX, &f.id, index);
            if f.name.ends_with("-link") {
                f.value = link.to_owned();
            }
            f
        })
        .collect();
    Row::new(index, fields)
}

pub fn empty_formset() -> FormsetGroup {
    FormsetGroup::new(SAMPLE_PREFIX, vec![], 0, sample_template())
}

pub fn formset_with_rows(rows: Vec<Row>) -> FormsetGroup {
    let total = rows.len();
    FormsetGroup::new(SAMPLE_PREFIX, rows, total, sample_template())
}

pub fn text_snapshot(pairs: &[(&str, &str)]) -> FieldSnapshot {
    let fields: Vec<_> =
        pairs.iter().map(|(name, value)| FieldState::new(*name, FieldKind::Text, *value)).collect();
    FieldSnapshot::capture(&fields)
}
