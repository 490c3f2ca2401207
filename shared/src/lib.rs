mod advice;
mod error;
mod label;
mod prediction;

pub use advice::{AdviceRequest, AdviceResponse};
pub use error::{ApiError, ErrorKind};
pub use label::DiseaseLabel;
pub use prediction::{
    PredictOptions, PredictRequest, PredictionResult, Probabilities, RankedProbability, Severity,
};

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Success,
    Error,
}
