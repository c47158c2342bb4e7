use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::snapshot::FieldSnapshot;


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtyPolicy {
    // A form is dirty only while some field differs from its snapshot. Editing a field and then
    // reverting it makes the form clean again.
    #[default]
    ValueMustDiffer,
    // Any edit makes the form dirty until it is submitted or discarded.
    AnyEdit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirtyState {
    #[default]
    Clean,
    Dirty,
}

impl DirtyState {
    pub fn is_dirty(self) -> bool { self == DirtyState::Dirty }
}

#[derive(Clone, Debug)]
pub struct TrackedForm {
    form_name: String,
    label: String,
    state: DirtyState,
    snapshot: Option<FieldSnapshot>,
}

impl TrackedForm {
    pub fn form_name(&self) -> &str { &self.form_name }
    pub fn label(&self) -> &str { &self.label }
    pub fn state(&self) -> DirtyState { self.state }
    pub fn is_dirty(&self) -> bool { self.state.is_dirty() }
    pub fn snapshot(&self) -> Option<&FieldSnapshot> { self.snapshot.as_ref() }

    // Fail-open: without a baseline nothing can be lost.
    pub fn is_changed(&self, live: &FieldSnapshot) -> bool {
        self.snapshot.as_ref().is_some_and(|snapshot| snapshot.differs_from(live))
    }
}

// Owns per-form dirty state. Forms are keyed by name and the tracker never holds page elements,
// so a form removed from the page only leaves a small record behind until `retain_forms`.
#[derive(Clone, Debug, Default)]
pub struct DirtyTracker {
    policy: DirtyPolicy,
    forms: Vec<TrackedForm>,
    // Most recently edited form that is still dirty.
    active: Option<String>,
}

impl DirtyTracker {
    pub fn new(policy: DirtyPolicy) -> Self { DirtyTracker { policy, ..Default::default() } }

    // Starts (or restarts) tracking a form with the given baseline. Re-tracking resets the state.
    pub fn track(&mut self, form_name: &str, label: &str, snapshot: FieldSnapshot) {
        let label = if label.trim().is_empty() { form_name } else { label };
        let form = TrackedForm {
            form_name: form_name.to_owned(),
            label: label.to_owned(),
            state: DirtyState::Clean,
            snapshot: Some(snapshot),
        };
        match self.forms.iter_mut().find(|f| f.form_name == form_name) {
            Some(existing) => *existing = form,
            None => self.forms.push(form),
        }
        if self.active.as_deref() == Some(form_name) {
            self.active = None;
        }
    }

    pub fn form(&self, form_name: &str) -> Option<&TrackedForm> {
        self.forms.iter().find(|f| f.form_name == form_name)
    }
    fn form_mut(&mut self, form_name: &str) -> Option<&mut TrackedForm> {
        self.forms.iter_mut().find(|f| f.form_name == form_name)
    }

    pub fn forms(&self) -> impl Iterator<Item = &TrackedForm> { self.forms.iter() }

    // Reacts to an `input`/`change` event. Returns the new state, or `None` for untracked forms.
    pub fn on_edit(&mut self, form_name: &str, live: &FieldSnapshot) -> Option<DirtyState> {
        let policy = self.policy;
        let form = self.form_mut(form_name)?;
        form.state = match policy {
            DirtyPolicy::AnyEdit => DirtyState::Dirty,
            DirtyPolicy::ValueMustDiffer => {
                if form.is_changed(live) {
                    DirtyState::Dirty
                } else {
                    DirtyState::Clean
                }
            }
        };
        let state = form.state;
        self.update_active(form_name, state);
        Some(state)
    }

    // Called on a successful submit: the current values become the new baseline.
    pub fn mark_clean(&mut self, form_name: &str, live: FieldSnapshot) {
        if let Some(form) = self.form_mut(form_name) {
            form.snapshot = Some(live);
            form.state = DirtyState::Clean;
        }
        self.update_active(form_name, DirtyState::Clean);
    }

    // "Leave without saving": forget the edits without adopting them as a baseline.
    pub fn discard(&mut self, form_name: &str) {
        if let Some(form) = self.form_mut(form_name) {
            form.state = DirtyState::Clean;
        }
        self.update_active(form_name, DirtyState::Clean);
    }

    // Adds the baseline of fields created after tracking started (new formset rows).
    pub fn extend_snapshot(&mut self, form_name: &str, fields: FieldSnapshot) {
        if let Some(snapshot) = self.form_mut(form_name).and_then(|f| f.snapshot.as_mut()) {
            snapshot.extend(fields);
        }
    }

    // Adopts values the page set programmatically as the new baseline of those fields, so that
    // they do not keep the form dirty after the user reverts their own edits.
    pub fn rebase_snapshot(&mut self, form_name: &str, fields: FieldSnapshot) {
        if let Some(snapshot) = self.form_mut(form_name).and_then(|f| f.snapshot.as_mut()) {
            snapshot.rebase(fields);
        }
    }

    pub fn retain_forms<'a>(&mut self, live_names: impl IntoIterator<Item = &'a str>) {
        let live_names = live_names.into_iter().collect_vec();
        self.forms.retain(|f| live_names.contains(&f.form_name.as_str()));
        if let Some(active) = &self.active {
            if !live_names.contains(&active.as_str()) {
                self.active = None;
            }
        }
    }

    pub fn is_dirty(&self, form_name: &str) -> bool {
        self.form(form_name).is_some_and(TrackedForm::is_dirty)
    }

    pub fn any_dirty(&self) -> bool { self.forms.iter().any(TrackedForm::is_dirty) }

    // The form the user should be told about: the last edited one, or any other dirty form.
    pub fn active_form(&self) -> Option<&TrackedForm> {
        self.active
            .as_deref()
            .and_then(|name| self.form(name))
            .filter(|f| f.is_dirty())
            .or_else(|| self.forms.iter().find(|f| f.is_dirty()))
    }

    fn update_active(&mut self, form_name: &str, state: DirtyState) {
        match state {
            DirtyState::Dirty => self.active = Some(form_name.to_owned()),
            DirtyState::Clean => {
                if self.active.as_deref() == Some(form_name) {
                    self.active = None;
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldState};

    fn snapshot(pairs: &[(&str, &str)]) -> FieldSnapshot {
        let fields: Vec<_> =
            pairs.iter().map(|(n, v)| FieldState::new(*n, FieldKind::Text, *v)).collect();
        FieldSnapshot::capture(&fields)
    }

    #[test]
    fn untracked_form_is_ignored() {
        let mut tracker = DirtyTracker::new(DirtyPolicy::ValueMustDiffer);
        assert_eq!(tracker.on_edit("nope", &snapshot(&[("a", "1")])), None);
        assert!(!tracker.any_dirty());
    }

    #[test]
    fn any_edit_policy_ignores_values() {
        let mut tracker = DirtyTracker::new(DirtyPolicy::AnyEdit);
        tracker.track("site", "", snapshot(&[("a", "1")]));
        assert_eq!(tracker.on_edit("site", &snapshot(&[("a", "1")])), Some(DirtyState::Dirty));
        assert_eq!(tracker.form("site").unwrap().label(), "site");
    }

    #[test]
    fn active_form_follows_last_edit() {
        let mut tracker = DirtyTracker::new(DirtyPolicy::ValueMustDiffer);
        tracker.track("a", "the A form", snapshot(&[("x", "")]));
        tracker.track("b", "the B form", snapshot(&[("y", "")]));
        tracker.on_edit("a", &snapshot(&[("x", "1")]));
        tracker.on_edit("b", &snapshot(&[("y", "1")]));
        assert_eq!(tracker.active_form().unwrap().form_name(), "b");
        tracker.discard("b");
        assert_eq!(tracker.active_form().unwrap().form_name(), "a");
        assert!(tracker.is_dirty("a"));
        assert!(!tracker.is_dirty("b"));
    }

    #[test]
    fn retain_forms_drops_removed_forms() {
        let mut tracker = DirtyTracker::new(DirtyPolicy::AnyEdit);
        tracker.track("a", "", FieldSnapshot::new());
        tracker.track("b", "", FieldSnapshot::new());
        tracker.on_edit("b", &FieldSnapshot::new());
        tracker.retain_forms(["a"]);
        assert!(tracker.form("b").is_none());
        assert!(!tracker.any_dirty());
        assert!(tracker.active_form().is_none());
    }
}
