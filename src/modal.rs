// Visibility of the unsaved-changes modal. Both transitions are idempotent; the return value tells
// the caller whether the page needs to be updated at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModalVisibility {
    #[default]
    Hidden,
    Shown,
}

impl ModalVisibility {
    pub fn is_shown(self) -> bool { self == ModalVisibility::Shown }

    pub fn show(&mut self) -> bool { self.set(ModalVisibility::Shown) }
    pub fn hide(&mut self) -> bool { self.set(ModalVisibility::Hidden) }

    fn set(&mut self, value: ModalVisibility) -> bool {
        let changed = *self != value;
        *self = value;
        changed
    }
}

// The three buttons of the modal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalChoice {
    Stay,
    Leave,
    SaveAndContinue,
}
