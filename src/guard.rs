use crate::dirty::DirtyTracker;
use crate::modal::{ModalChoice, ModalVisibility};


// What the page knows about a clicked `<a>`/`<button>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClickTarget {
    pub href: Option<String>,
    pub download: bool,
    pub bypass: bool,
    pub cancel: bool,
    // Elements that manage their own confirmation or never leave the page (delete buttons,
    // AJAX modal links).
    pub exempt: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationCandidate {
    Link { href: String },
    Cancel { href: Option<String> },
    Unload,
}

impl ClickTarget {
    pub fn classify(&self) -> Option<NavigationCandidate> {
        if self.bypass || self.exempt {
            return None;
        }
        let href = self.href.as_deref().map(str::trim).filter(|href| is_navigation_href(href));
        if self.cancel {
            return Some(NavigationCandidate::Cancel { href: href.map(str::to_owned) });
        }
        if self.download {
            return None;
        }
        href.map(|href| NavigationCandidate::Link { href: href.to_owned() })
    }
}

fn is_navigation_href(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with('#')
        && !href.to_ascii_lowercase().starts_with("javascript:")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    // The default action must be suppressed. For `Unload` this means asking the browser for its
    // native prompt, for clicks the modal has been shown.
    Deferred,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingTarget {
    Url(String),
    // The candidate had no URL (e.g. a cancel button handled by a script); the original click
    // is repeated once the guard lets it through.
    ReplayClick,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingNavigation {
    pub target: PendingTarget,
    pub form_name: String,
}

// What the page must do after a modal choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardAction {
    None,
    Navigate(String),
    ReplayClick,
    SubmitForm { form_name: String, next: Option<String> },
}

#[derive(Clone, Debug, Default)]
pub struct NavigationGuard {
    pending: Option<PendingNavigation>,
    modal: ModalVisibility,
}

impl NavigationGuard {
    pub fn new() -> Self { Self::default() }

    pub fn pending(&self) -> Option<&PendingNavigation> { self.pending.as_ref() }
    pub fn modal(&self) -> ModalVisibility { self.modal }

    pub fn guard(
        &mut self, tracker: &DirtyTracker, candidate: NavigationCandidate,
    ) -> GuardDecision {
        let Some(form) = tracker.active_form() else {
            return GuardDecision::Proceed;
        };
        let target = match candidate {
            NavigationCandidate::Unload => return GuardDecision::Deferred,
            NavigationCandidate::Link { href } => PendingTarget::Url(href),
            NavigationCandidate::Cancel { href: Some(href) } => PendingTarget::Url(href),
            NavigationCandidate::Cancel { href: None } => PendingTarget::ReplayClick,
        };
        self.pending = Some(PendingNavigation { target, form_name: form.form_name().to_owned() });
        self.modal.show();
        GuardDecision::Deferred
    }

    // Applies a modal choice. The modal is hidden in every case; `modal_changed` in the result
    // tells whether it was visible before.
    pub fn choose(&mut self, tracker: &mut DirtyTracker, choice: ModalChoice) -> ChoiceOutcome {
        let modal_changed = self.modal.hide();
        let pending = self.pending.take();
        let action = match (choice, pending) {
            (ModalChoice::Stay, _) | (_, None) => GuardAction::None,
            (ModalChoice::Leave, Some(pending)) => {
                tracker.discard(&pending.form_name);
                match pending.target {
                    PendingTarget::Url(url) => GuardAction::Navigate(url),
                    PendingTarget::ReplayClick => GuardAction::ReplayClick,
                }
            }
            (ModalChoice::SaveAndContinue, Some(pending)) => {
                if tracker.form(&pending.form_name).is_none() {
                    GuardAction::None
                } else {
                    let next = match pending.target {
                        PendingTarget::Url(url) => Some(url),
                        PendingTarget::ReplayClick => None,
                    };
                    GuardAction::SubmitForm { form_name: pending.form_name, next }
                }
            }
        };
        ChoiceOutcome { action, modal_changed }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOutcome {
    pub action: GuardAction,
    pub modal_changed: bool,
}

pub fn unsaved_changes_message(template: &str, label: &str) -> String {
    template.replace("{label}", label)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str) -> ClickTarget {
        ClickTarget { href: Some(href.to_owned()), ..Default::default() }
    }

    #[test]
    fn classify_links() {
        assert_eq!(
            link("/sites/").classify(),
            Some(NavigationCandidate::Link { href: "/sites/".to_owned() })
        );
        assert_eq!(link("#tab-2").classify(), None);
        assert_eq!(link("").classify(), None);
        assert_eq!(link("javascript:void(0)").classify(), None);
        assert_eq!(ClickTarget { download: true, ..link("/export.csv") }.classify(), None);
        assert_eq!(ClickTarget { bypass: true, ..link("/logout/") }.classify(), None);
        assert_eq!(ClickTarget { exempt: true, ..link("/delete/") }.classify(), None);
        assert_eq!(ClickTarget::default().classify(), None);
    }

    #[test]
    fn classify_cancel() {
        let cancel = ClickTarget { cancel: true, ..Default::default() };
        assert_eq!(cancel.classify(), Some(NavigationCandidate::Cancel { href: None }));
        let cancel = ClickTarget { cancel: true, ..link("/back/") };
        assert_eq!(
            cancel.classify(),
            Some(NavigationCandidate::Cancel { href: Some("/back/".to_owned()) })
        );
    }

    #[test]
    fn message_template() {
        assert_eq!(
            unsaved_changes_message("You have unsaved changes in the {label}.", "site form"),
            "You have unsaved changes in the site form."
        );
    }
}
