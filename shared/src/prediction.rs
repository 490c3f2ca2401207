use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DiseaseLabel;

/// Class name to probability, as returned by the model.
pub type Probabilities = BTreeMap<String, f64>;

const HIGH_CONFIDENCE_PERCENT: u32 = 80;
const RETAKE_BELOW_PERCENT: u32 = 60;
const RANKED_LIMIT: usize = 4;

/// Body of the prediction endpoint's `POST`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub image_base64: String,
    pub options: PredictOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictOptions {
    pub return_probs: bool,
}

impl PredictRequest {
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            image_base64: image_base64.into(),
            options: PredictOptions { return_probs: true },
        }
    }
}

/// Classifier output. `label` is kept as the raw wire string: the service is
/// trusted to name one of its own `probs` keys and nothing checks it here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub probs: Probabilities,
    pub latency_ms: u64,
    pub model_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Healthy,
    High,
    Medium,
    Low,
}

impl Severity {
    fn classify(label: &str, probability: f64) -> Self {
        if label == DiseaseLabel::HealthyLeaf.as_str() {
            Severity::Healthy
        } else if probability >= 0.6 {
            Severity::High
        } else if probability >= 0.3 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedProbability {
    pub label: String,
    pub display_name: String,
    pub probability: f64,
    pub percent: u32,
    pub severity: Severity,
}

fn to_percent(probability: f64) -> u32 {
    (probability * 100.0).round().clamp(0.0, 100.0) as u32
}

impl PredictionResult {
    pub fn disease(&self) -> Option<DiseaseLabel> {
        self.label.parse().ok()
    }

    pub fn display_name(&self) -> &str {
        DiseaseLabel::display_name_for(&self.label)
    }

    /// Probability of the predicted label as a rounded percentage, 0 when
    /// the label has no entry in `probs`.
    pub fn confidence_percent(&self) -> u32 {
        self.probs.get(&self.label).copied().map(to_percent).unwrap_or(0)
    }

    pub fn is_healthy(&self) -> bool {
        self.disease() == Some(DiseaseLabel::HealthyLeaf)
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence_percent() >= HIGH_CONFIDENCE_PERCENT
    }

    /// A diseased verdict this unsure should be re-photographed.
    pub fn needs_retake(&self) -> bool {
        !self.is_healthy() && self.confidence_percent() < RETAKE_BELOW_PERCENT
    }

    /// Top entries of `probs`, most likely first.
    pub fn ranked_probabilities(&self) -> Vec<RankedProbability> {
        let mut entries: Vec<(&String, f64)> =
            self.probs.iter().map(|(label, p)| (label, *p)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));

        entries
            .into_iter()
            .take(RANKED_LIMIT)
            .map(|(label, probability)| RankedProbability {
                label: label.clone(),
                display_name: DiseaseLabel::display_name_for(label).to_string(),
                probability,
                percent: to_percent(probability),
                severity: Severity::classify(label, probability),
            })
            .collect()
    }
}
