#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod ajax;
pub mod config;
pub mod delete_button;
pub mod dirty;
pub mod error;
pub mod field;
pub mod formset;
pub mod guard;
pub mod modal;
pub mod snapshot;
pub mod test_util;

pub use config::GlueConfig;
pub use dirty::{DirtyPolicy, DirtyState, DirtyTracker, TrackedForm};
pub use error::{AjaxError, GlueError};
pub use field::{FieldKind, FieldState};
pub use formset::{AddRowOutcome, FormsetGroup, RemoveRowOutcome, Row, reindex_row};
pub use guard::{ClickTarget, GuardAction, GuardDecision, NavigationCandidate, NavigationGuard};
pub use modal::{ModalChoice, ModalVisibility};
pub use snapshot::FieldSnapshot;
