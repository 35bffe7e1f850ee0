use crate::classify::{ClassifyError, Prediction};
use crate::history::HistoryEntry;
use crate::intake::SelectedImage;

/// Lifecycle of one upload cycle. Holding the result and the error inside
/// the phase makes "at most one of them" structural rather than a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Submitting { generation: u64 },
    Succeeded { prediction: Prediction },
    Failed { message: String },
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Everything the window owns about the current session.
#[derive(Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub selected: Option<SelectedImage>,
    pub history: Vec<HistoryEntry>,
    pub show_history: bool,
}

impl SessionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitting { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Succeeded { .. } | SessionPhase::Failed { .. }
        )
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.phase {
            SessionPhase::Succeeded { prediction } => Some(prediction),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Take a new selection. Whatever the previous cycle showed, result or
    /// error, disappears the moment a new submission starts.
    pub fn begin_submission(&mut self, selected: SelectedImage, generation: u64) {
        self.selected = Some(selected);
        self.phase = SessionPhase::Submitting { generation };
    }

    /// Settle the cycle for `generation`. Outcomes from superseded
    /// generations are dropped; returns whether this one was current.
    pub fn settle(&mut self, generation: u64, outcome: Result<Prediction, ClassifyError>) -> bool {
        match self.phase {
            SessionPhase::Submitting {
                generation: current,
            } if current == generation => {
                self.phase = match outcome {
                    Ok(prediction) => SessionPhase::Succeeded { prediction },
                    Err(err) => SessionPhase::Failed {
                        message: err.to_string(),
                    },
                };
                true
            }
            _ => false,
        }
    }

    /// Back to Idle, dropping the selection.
    pub fn clear(&mut self) {
        self.phase = SessionPhase::Idle;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn selection(name: &str) -> SelectedImage {
        SelectedImage {
            file_name: name.to_string(),
            path: PathBuf::from(name),
            bytes: Arc::new(vec![1, 2, 3]),
            mime: "image/png",
        }
    }

    fn healthy() -> Prediction {
        Prediction {
            class: "Healthy".to_string(),
            confidence: 0.987,
        }
    }

    #[test]
    fn submission_clears_previous_result_and_error() {
        let mut state = SessionState::default();
        state.begin_submission(selection("a.png"), 1);
        assert!(state.settle(1, Ok(healthy())));
        assert!(state.prediction().is_some());

        state.begin_submission(selection("b.png"), 2);
        assert!(state.is_submitting());
        assert!(state.prediction().is_none());
        assert!(state.error_message().is_none());
    }

    #[test]
    fn success_and_error_are_mutually_exclusive() {
        let mut state = SessionState::default();
        state.begin_submission(selection("a.png"), 1);
        assert!(state.settle(1, Ok(healthy())));
        assert!(state.prediction().is_some());
        assert!(state.error_message().is_none());

        state.begin_submission(selection("b.png"), 2);
        let refused = ClassifyError::Service {
            status: 400,
            detail: "File must be an image".to_string(),
        };
        assert!(state.settle(2, Err(refused)));
        assert!(state.prediction().is_none());
        assert_eq!(state.error_message(), Some("File must be an image"));
    }

    #[test]
    fn stale_generation_cannot_settle_a_newer_submission() {
        let mut state = SessionState::default();
        state.begin_submission(selection("slow.png"), 1);
        state.begin_submission(selection("fast.png"), 2);

        assert!(!state.settle(1, Ok(healthy())));
        assert!(state.is_submitting());

        let lost = ClassifyError::Transport {
            reason: "connection reset".to_string(),
        };
        assert!(state.settle(2, Err(lost)));
        assert_eq!(
            state.error_message(),
            Some("Failed to analyze image. Please try again.")
        );
    }

    #[test]
    fn settling_twice_has_no_second_effect() {
        let mut state = SessionState::default();
        state.begin_submission(selection("a.png"), 1);
        assert!(state.settle(1, Ok(healthy())));
        assert!(!state.settle(
            1,
            Err(ClassifyError::Transport {
                reason: "late duplicate".to_string(),
            })
        ));
        assert!(state.prediction().is_some());
    }

    #[test]
    fn loading_holds_exactly_between_dispatch_and_settle() {
        let mut state = SessionState::default();
        assert!(!state.is_submitting());
        state.begin_submission(selection("a.png"), 1);
        assert!(state.is_submitting());
        state.settle(1, Ok(healthy()));
        assert!(!state.is_submitting());
        assert!(state.is_settled());
    }

    #[test]
    fn clear_returns_to_idle_without_touching_history() {
        let mut state = SessionState::default();
        state.history.push(HistoryEntry {
            class: "Healthy".to_string(),
            confidence: 0.9,
            timestamp: "2026-08-25T10:00:00Z".to_string(),
            id: 1,
        });
        state.begin_submission(selection("a.png"), 1);
        state.settle(1, Ok(healthy()));

        state.clear();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(state.selected.is_none());
        assert_eq!(state.history.len(), 1);
    }
}
