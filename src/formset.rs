//! Planning side of dynamic formsets.
//!
//! A formset is a group of rows whose field names look like `{prefix}-{index}-{field}` (ids are
//! usually `id_{prefix}-{index}-{field}`), a hidden `{prefix}-TOTAL_FORMS` counter and a template
//! row whose fields carry the `__prefix__` placeholder instead of an index. Nothing here touches
//! the page: the browser layer reads the group into a [`FormsetGroup`], asks it what to do and
//! applies the resulting [`Row`] back.
//!
//! Rows are never physically removed. Removal sets the row's `-DELETE` flag and hides the row,
//! which keeps indices contiguous for the server-side formset processor.

use regex_lite::Regex;

use crate::field::{AFFIRMATIVE, DELETE_SUFFIX, FieldKind, FieldState};
use crate::snapshot::FieldSnapshot;


pub const PLACEHOLDER: &str = "__prefix__";

// Rewrites the index token that follows `{prefix}-` in a field name or id. Only the token in that
// position changes, so digits elsewhere (e.g. `address2`) survive. Values without the prefix
// pattern fall back to replacing every literal placeholder.
pub fn reindex_attr(prefix: &str, value: &str, index: usize) -> String {
    match prefixed_index_regex(prefix) {
        Some(re) if re.is_match(value) => {
            re.replace_all(value, format!("${{head}}{index}${{tail}}").as_str()).into_owned()
        }
        _ => value.replace(PLACEHOLDER, &index.to_string()),
    }
}

// Extracts the row index from a field name or id. `None` for template fields.
pub fn parse_row_index(prefix: &str, value: &str) -> Option<usize> {
    let re = prefixed_index_regex(prefix)?;
    let captures = re.captures(value)?;
    captures.name("index")?.as_str().parse().ok()
}

// The prefix must start the value, follow Django's `id_` or follow a non-word character: `set`
// must not match inside `subset-0-x`.
fn prefixed_index_regex(prefix: &str) -> Option<Regex> {
    let pattern = format!(
        r"(?P<head>(?:^|id_|[^A-Za-z0-9_]){}-)(?P<index>{}|[0-9]+)(?P<tail>-)",
        regex_lite::escape(prefix),
        PLACEHOLDER,
    );
    Regex::new(&pattern).ok()
}

pub fn total_forms_name(prefix: &str) -> String { format!("{prefix}-TOTAL_FORMS") }
pub fn delete_field_name(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index}{DELETE_SUFFIX}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub fields: Vec<FieldState>,
    pub deleted: bool,
    pub hidden: bool,
}

impl Row {
    pub fn new(index: usize, fields: Vec<FieldState>) -> Self {
        Row { index, fields, deleted: false, hidden: false }
    }

    pub fn is_visible(&self) -> bool { !self.hidden && !self.deleted }

    // The deletion flag does not count as data: a row marked for deletion by hand is still empty.
    pub fn has_data(&self) -> bool {
        self.fields.iter().filter(|f| !f.is_delete_flag()).any(FieldState::has_data)
    }

    pub fn delete_field(&self) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.is_delete_flag())
    }

    pub fn snapshot(&self) -> FieldSnapshot { FieldSnapshot::capture(&self.fields) }

    fn mark_deleted(&mut self, prefix: &str) {
        match self.fields.iter_mut().find(|f| f.is_delete_flag()) {
            Some(flag) => {
                flag.value = AFFIRMATIVE.to_owned();
                flag.checked = true;
            }
            None => {
                self.fields.push(FieldState::new(
                    delete_field_name(prefix, self.index),
                    FieldKind::Hidden,
                    AFFIRMATIVE,
                ));
            }
        }
        self.deleted = true;
        self.hidden = true;
    }
}

// Clones `template` into a blank row at `index`. Pure: the template is not modified and no live
// element is involved.
pub fn reindex_row(prefix: &str, template: &[FieldState], index: usize) -> Row {
    let fields = template
        .iter()
        .map(|field| {
            let mut field = field.clone();
            field.clear();
            if !field.name.is_empty() {
                field.name = reindex_attr(prefix, &field.name, index);
            }
            if !field.id.is_empty() {
                field.id = reindex_attr(prefix, &field.id, index);
            }
            field
        })
        .collect();
    Row::new(index, fields)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddRowOutcome {
    Added(Row),
    // Refused because the row at this position (in `rows()`) is visible and blank.
    RejectedEmptyRow(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveRowOutcome {
    NotFound,
    Declined,
    SoftDeleted,
}

#[derive(Clone, Debug)]
pub struct FormsetGroup {
    prefix: String,
    rows: Vec<Row>,
    total_forms: usize,
    template: Vec<FieldState>,
}

impl FormsetGroup {
    pub fn new(
        prefix: impl Into<String>, rows: Vec<Row>, total_forms: usize, template: Vec<FieldState>,
    ) -> Self {
        FormsetGroup { prefix: prefix.into(), rows, total_forms, template }
    }

    pub fn prefix(&self) -> &str { &self.prefix }
    pub fn rows(&self) -> &[Row] { &self.rows }
    pub fn total_forms(&self) -> usize { self.total_forms }
    pub fn template(&self) -> &[FieldState] { &self.template }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.is_visible())
    }

    pub fn first_empty_visible_row(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.is_visible() && !r.has_data())
    }

    // Never creates a second blank row: the user has to fill (or remove) the existing one first.
    pub fn add_row(&mut self) -> AddRowOutcome {
        if let Some(position) = self.first_empty_visible_row() {
            return AddRowOutcome::RejectedEmptyRow(position);
        }
        let row = reindex_row(&self.prefix, &self.template, self.total_forms);
        self.rows.push(row.clone());
        self.total_forms += 1;
        AddRowOutcome::Added(row)
    }

    // `confirm` is asked only when the row holds data.
    pub fn remove_row(&mut self, index: usize, confirm: impl FnOnce() -> bool) -> RemoveRowOutcome {
        let prefix = self.prefix.clone();
        let Some(row) = self.rows.iter_mut().find(|r| r.index == index && !r.deleted) else {
            return RemoveRowOutcome::NotFound;
        };
        if row.has_data() && !confirm() {
            return RemoveRowOutcome::Declined;
        }
        row.mark_deleted(&prefix);
        RemoveRowOutcome::SoftDeleted
    }

    pub fn row(&self, index: usize) -> Option<&Row> { self.rows.iter().find(|r| r.index == index) }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reindex_placeholder_and_index() {
        assert_eq!(reindex_attr("doi", "doi-__prefix__-link", 3), "doi-3-link");
        assert_eq!(reindex_attr("doi", "id_doi-__prefix__-link", 3), "id_doi-3-link");
        assert_eq!(reindex_attr("doi", "doi-0-link", 12), "doi-12-link");
        assert_eq!(reindex_attr("doi", "doi-4-address2", 5), "doi-5-address2");
    }

    #[test]
    fn reindex_keeps_digits_in_prefix() {
        assert_eq!(reindex_attr("photo2", "photo2-__prefix__-file", 1), "photo2-1-file");
        assert_eq!(reindex_attr("set", "subset-0-x", 1), "subset-0-x");
    }

    #[test]
    fn reindex_fallback_to_placeholder() {
        assert_eq!(reindex_attr("doi", "custom___prefix__", 2), "custom_2");
        assert_eq!(reindex_attr("doi", "plain", 2), "plain");
    }

    #[test]
    fn row_index() {
        assert_eq!(parse_row_index("doi", "doi-7-link"), Some(7));
        assert_eq!(parse_row_index("doi", "id_doi-7-link"), Some(7));
        assert_eq!(parse_row_index("doi", "doi-__prefix__-link"), None);
        assert_eq!(parse_row_index("doi", "other-7-link"), None);
    }

    #[test]
    fn reindex_row_clears_values() {
        let template = vec![
            FieldState::new("doi-__prefix__-link", FieldKind::Text, "stale")
                .with_id("id_doi-__prefix__-link"),
            FieldState::new("doi-__prefix__-primary", FieldKind::Checkbox, "on").with_checked(true),
        ];
        let row = reindex_row("doi", &template, 4);
        assert_eq!(row.index, 4);
        assert_eq!(
            row.fields[0],
            FieldState::new("doi-4-link", FieldKind::Text, "").with_id("id_doi-4-link")
        );
        assert_eq!(row.fields[1], FieldState::new("doi-4-primary", FieldKind::Checkbox, "on"));
        assert!(!row.has_data());
        // Template untouched.
        assert_eq!(template[0].value, "stale");
    }

    #[test]
    fn delete_flag_is_not_data() {
        let row = Row::new(0, vec![
            FieldState::new("doi-0-link", FieldKind::Text, ""),
            FieldState::new("doi-0-DELETE", FieldKind::Hidden, "on"),
        ]);
        assert!(!row.has_data());
    }
}
