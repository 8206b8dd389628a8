//! Worker lifecycle states
//!
//! ```text
//! Uninstalled → Installing → Installed ─┬─→ Activating → Active → Redundant
//!                                       └─→ Waiting ─┘
//! ```

use crate::error::{ScopeCacheError, ScopeCacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one worker version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Created, install event not yet dispatched
    Uninstalled,
    /// Install event dispatched, gated work pending
    Installing,
    /// Install settled
    Installed,
    /// Installed, waiting for older versions to release control
    Waiting,
    /// Activate event dispatched, gated work pending
    Activating,
    /// Controlling its scope; receives fetch and message events
    Active,
    /// Failed install or superseded by a newer version
    Redundant,
}

impl WorkerState {
    /// Whether `self → to` is a legal transition
    pub fn can_transition(self, to: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, to),
            (Uninstalled, Installing)
                | (Installing, Installed)
                | (Installing, Redundant)
                | (Installed, Waiting)
                | (Installed, Activating)
                | (Installed, Redundant)
                | (Waiting, Activating)
                | (Waiting, Redundant)
                | (Activating, Active)
                | (Active, Redundant)
        )
    }

    /// Transition to `to`, or fail with [`ScopeCacheError::InvalidTransition`]
    pub fn transition(self, to: WorkerState) -> ScopeCacheResult<WorkerState> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(ScopeCacheError::transition(self, to))
        }
    }

    pub fn is_active(self) -> bool {
        self == WorkerState::Active
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_with_skip_waiting() {
        let state = WorkerState::Uninstalled
            .transition(WorkerState::Installing)
            .and_then(|s| s.transition(WorkerState::Installed))
            .and_then(|s| s.transition(WorkerState::Activating))
            .and_then(|s| s.transition(WorkerState::Active))
            .unwrap();
        assert!(state.is_active());
    }

    #[test]
    fn waiting_path() {
        assert!(WorkerState::Installed.can_transition(WorkerState::Waiting));
        assert!(WorkerState::Waiting.can_transition(WorkerState::Activating));
    }

    #[test]
    fn cannot_skip_install() {
        let err = WorkerState::Uninstalled
            .transition(WorkerState::Active)
            .unwrap_err();
        assert!(err.to_string().contains("uninstalled"));
    }

    #[test]
    fn active_is_terminal_until_superseded() {
        assert!(!WorkerState::Active.can_transition(WorkerState::Installing));
        assert!(WorkerState::Active.can_transition(WorkerState::Redundant));
        assert!(!WorkerState::Redundant.can_transition(WorkerState::Active));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&WorkerState::Waiting).unwrap();
        assert_eq!(json, "\"waiting\"");
    }
}
