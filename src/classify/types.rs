use thiserror::Error;

/// A settled verdict from the classifier service.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
}

/// Terminal outcome of one submission, tagged with the generation that
/// dispatched it so a superseded request cannot overwrite a newer one.
#[derive(Debug)]
pub struct ClassifyEvent {
    pub generation: u64,
    pub outcome: Result<Prediction, ClassifyError>,
}

/// What went wrong with a classification. `Display` is the exact text shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// The service rejected the request with its own message; surfaced
    /// verbatim.
    #[error("{detail}")]
    Service { status: u16, detail: String },
    /// The request never produced a usable answer. `reason` goes to the log;
    /// the user sees only the generic retry text.
    #[error("Failed to analyze image. Please try again.")]
    Transport { reason: String },
}
