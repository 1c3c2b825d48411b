//! Training state stub
//!
//! The control plane reports and toggles a training state; the training
//! itself happens in the external ML stack.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Snapshot of the training state as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub in_progress: bool,
    pub progress: u8,
    pub logs: Vec<String>,
    pub last_trained: Option<String>,
}

impl Default for TrainingStatus {
    fn default() -> Self {
        Self {
            in_progress: false,
            progress: 0,
            logs: Vec::new(),
            last_trained: None,
        }
    }
}

/// Process-local training state behind an RW lock; reads dominate.
#[derive(Debug, Default)]
pub struct TrainingState {
    inner: RwLock<TrainingStatus>,
}

impl TrainingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TrainingStatus {
        self.inner
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Mark training started. Returns false when a run is already marked
    /// in progress (the caller surfaces that as a 409).
    pub fn start(&self) -> bool {
        match self.inner.write() {
            Ok(mut state) => {
                if state.in_progress {
                    return false;
                }
                state.in_progress = true;
                state.progress = 0;
                state.logs = vec!["Training started".to_string()];
                true
            }
            Err(_) => false,
        }
    }

    /// Mark training finished with the given completion stamp.
    pub fn finish(&self, completed_at: String) {
        if let Ok(mut state) = self.inner.write() {
            state.in_progress = false;
            state.progress = 100;
            state.logs.push("Training complete".to_string());
            state.last_trained = Some(completed_at);
        }
    }
}
