//! Run-state checkpointing.
//!
//! A checkpoint is a plain serializable blob keyed by run id. The caller
//! decides where to put it and when to restore; resumption is re-entering
//! `explore` with the restored state, not a hidden lifecycle event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uiscout_core_types::RunId;

use crate::errors::ExploreError;
use crate::state::ExplorationState;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub run_id: RunId,
    pub captured_at: DateTime<Utc>,
    pub state: ExplorationState,
}

impl Checkpoint {
    pub fn capture(state: &ExplorationState) -> Self {
        Self {
            run_id: state.run_id.clone(),
            captured_at: Utc::now(),
            state: state.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExploreError> {
        serde_json::to_string(self).map_err(|err| ExploreError::Checkpoint(err.to_string()))
    }

    pub fn from_json(blob: &str) -> Result<Self, ExploreError> {
        serde_json::from_str(blob).map_err(|err| ExploreError::Checkpoint(err.to_string()))
    }

    pub fn restore(self) -> ExplorationState {
        self.state
    }
}
