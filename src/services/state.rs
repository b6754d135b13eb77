use chrono::{DateTime, Utc};

use crate::models::{FetchOutcome, SupplySnapshot};

/// What the dashboard currently shows.
#[derive(Debug, Clone, Default)]
pub enum ViewState {
    #[default]
    Loading,
    Loaded {
        snapshot: SupplySnapshot,
        updated_at: DateTime<Utc>,
    },
}

impl ViewState {
    /// State after a poll outcome, or `None` if the outcome leaves the
    /// current state in place (failed requests never touch it).
    pub fn after(outcome: FetchOutcome) -> Option<ViewState> {
        match outcome {
            FetchOutcome::Loaded(snapshot) => Some(ViewState::Loaded {
                snapshot,
                updated_at: Utc::now(),
            }),
            FetchOutcome::Malformed => Some(ViewState::Loading),
            FetchOutcome::Failed(_) => None,
        }
    }
}

#[cfg(test)]
impl ViewState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ViewState::Loaded { .. })
    }

    pub fn snapshot(&self) -> Option<&SupplySnapshot> {
        match self {
            ViewState::Loaded { snapshot, .. } => Some(snapshot),
            ViewState::Loading => None,
        }
    }
}
