use formguard::guard::{PendingTarget, unsaved_changes_message};
use formguard::test_util::text_snapshot;
use formguard::{
    ClickTarget, DirtyPolicy, DirtyTracker, GuardAction, GuardDecision, ModalChoice,
    NavigationCandidate, NavigationGuard,
};
use pretty_assertions::assert_eq;


fn dirty_tracker() -> DirtyTracker {
    let mut tracker = DirtyTracker::new(DirtyPolicy::ValueMustDiffer);
    tracker.track("equipment", "equipment form", text_snapshot(&[("serial", "")]));
    tracker.on_edit("equipment", &text_snapshot(&[("serial", "X1")]));
    tracker
}

fn link(href: &str) -> NavigationCandidate { NavigationCandidate::Link { href: href.to_owned() } }

#[test]
fn clean_page_proceeds() {
    let tracker = DirtyTracker::new(DirtyPolicy::ValueMustDiffer);
    let mut guard = NavigationGuard::new();
    assert_eq!(guard.guard(&tracker, link("/sites/")), GuardDecision::Proceed);
    assert_eq!(guard.guard(&tracker, NavigationCandidate::Unload), GuardDecision::Proceed);
    assert!(!guard.modal().is_shown());
}

#[test]
fn dirty_link_then_leave() {
    let mut tracker = dirty_tracker();
    let mut guard = NavigationGuard::new();
    assert_eq!(guard.guard(&tracker, link("/sites/")), GuardDecision::Deferred);
    assert!(guard.modal().is_shown());
    assert_eq!(guard.pending().unwrap().target, PendingTarget::Url("/sites/".to_owned()));

    let outcome = guard.choose(&mut tracker, ModalChoice::Leave);
    assert_eq!(outcome.action, GuardAction::Navigate("/sites/".to_owned()));
    assert!(outcome.modal_changed);
    assert!(!tracker.any_dirty());
    assert!(guard.pending().is_none());
}

#[test]
fn stay_keeps_dirty_state() {
    let mut tracker = dirty_tracker();
    let mut guard = NavigationGuard::new();
    guard.guard(&tracker, link("/sites/"));
    let outcome = guard.choose(&mut tracker, ModalChoice::Stay);
    assert_eq!(outcome.action, GuardAction::None);
    assert!(tracker.is_dirty("equipment"));
    assert!(!guard.modal().is_shown());
    // Hiding again is a no-op.
    assert!(!guard.choose(&mut tracker, ModalChoice::Stay).modal_changed);
}

#[test]
fn save_and_continue_passes_next() {
    let mut tracker = dirty_tracker();
    let mut guard = NavigationGuard::new();
    guard.guard(&tracker, link("/equipment/"));
    let outcome = guard.choose(&mut tracker, ModalChoice::SaveAndContinue);
    assert_eq!(outcome.action, GuardAction::SubmitForm {
        form_name: "equipment".to_owned(),
        next: Some("/equipment/".to_owned()),
    });
}

#[test]
fn cancel_without_href_replays_click() {
    let mut tracker = dirty_tracker();
    let mut guard = NavigationGuard::new();
    let candidate = ClickTarget { cancel: true, ..Default::default() }.classify().unwrap();
    assert_eq!(guard.guard(&tracker, candidate), GuardDecision::Deferred);
    assert_eq!(guard.choose(&mut tracker, ModalChoice::Leave).action, GuardAction::ReplayClick);
}

#[test]
fn unload_defers_without_modal() {
    let tracker = dirty_tracker();
    let mut guard = NavigationGuard::new();
    assert_eq!(guard.guard(&tracker, NavigationCandidate::Unload), GuardDecision::Deferred);
    assert!(!guard.modal().is_shown());
    assert!(guard.pending().is_none());
}

#[test]
fn second_guard_replaces_pending() {
    let mut tracker = dirty_tracker();
    let mut guard = NavigationGuard::new();
    guard.guard(&tracker, link("/a/"));
    guard.guard(&tracker, link("/b/"));
    let outcome = guard.choose(&mut tracker, ModalChoice::Leave);
    assert_eq!(outcome.action, GuardAction::Navigate("/b/".to_owned()));
}

#[test]
fn message_names_active_form() {
    let tracker = dirty_tracker();
    let label = tracker.active_form().unwrap().label();
    assert_eq!(
        unsaved_changes_message("You have unsaved changes in the {label}.", label),
        "You have unsaved changes in the equipment form."
    );
}
