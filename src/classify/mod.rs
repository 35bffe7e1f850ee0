mod client;
#[cfg(test)]
pub mod testing;
mod types;

pub use client::PredictionClient;
pub use types::{ClassifyError, ClassifyEvent, Prediction};
