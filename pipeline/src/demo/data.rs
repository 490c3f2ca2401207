use shared::{AdviceResponse, DiseaseLabel, PredictionResult, Probabilities};

const DEMO_MODEL_VERSION: &str = "demo-model-v1";

fn probs(entries: [(DiseaseLabel, f64); 4]) -> Probabilities {
    entries
        .into_iter()
        .map(|(label, p)| (label.as_str().to_string(), p))
        .collect()
}

/// Canned classifier outputs returned in demo mode.
pub fn demo_predictions() -> Vec<PredictionResult> {
    vec![
        PredictionResult {
            label: DiseaseLabel::LeafBlight.as_str().to_string(),
            probs: probs([
                (DiseaseLabel::AlgalLeafSpot, 0.12),
                (DiseaseLabel::HealthyLeaf, 0.03),
                (DiseaseLabel::LeafBlight, 0.78),
                (DiseaseLabel::PhomopsisLeafSpot, 0.07),
            ]),
            latency_ms: 245,
            model_version: DEMO_MODEL_VERSION.to_string(),
        },
        PredictionResult {
            label: DiseaseLabel::HealthyLeaf.as_str().to_string(),
            probs: probs([
                (DiseaseLabel::AlgalLeafSpot, 0.05),
                (DiseaseLabel::HealthyLeaf, 0.89),
                (DiseaseLabel::LeafBlight, 0.04),
                (DiseaseLabel::PhomopsisLeafSpot, 0.02),
            ]),
            latency_ms: 198,
            model_version: DEMO_MODEL_VERSION.to_string(),
        },
    ]
}

fn advice(title: &str, bullets: [&str; 4], disclaimer: &str) -> AdviceResponse {
    AdviceResponse {
        title: title.to_string(),
        bullets: bullets.iter().map(|b| b.to_string()).collect(),
        disclaimer: disclaimer.to_string(),
    }
}

/// Canned care advice for a diagnosis.
pub fn demo_advice(label: DiseaseLabel) -> AdviceResponse {
    match label {
        DiseaseLabel::LeafBlight => advice(
            "Managing leaf blight",
            [
                "Prune infected leaves and branches and take them out of the orchard",
                "Spray a fungicide following the product label",
                "Lower humidity in the orchard by keeping proper spacing between trees",
                "Watch for new outbreaks and deal with them right away",
            ],
            "Test on a small area first and follow the label strictly",
        ),
        DiseaseLabel::AlgalLeafSpot => advice(
            "Managing algal leaf spot",
            [
                "Collect infected leaves and destroy them",
                "Reduce humidity and improve air circulation",
                "Spray a copper-based product as recommended",
                "Keep monitoring symptoms and keep treating",
            ],
            "Follow the recommendations and product labels strictly",
        ),
        DiseaseLabel::PhomopsisLeafSpot => advice(
            "Managing Phomopsis leaf spot",
            [
                "Prune infected parts and discard them",
                "Apply a suitable fungicide",
                "Keep drainage good and avoid standing water",
                "Stop the spread with good orchard sanitation",
            ],
            "Consult an expert for an accurate diagnosis and treatment",
        ),
        DiseaseLabel::HealthyLeaf => advice(
            "Keeping the tree healthy",
            [
                "The leaf looks healthy, keep the current growing conditions",
                "Check the tree regularly",
                "Fertilize and water appropriately",
                "Prevent disease with good orchard sanitation",
            ],
            "Preventive care is the key to keeping plants healthy",
        ),
    }
}

/// Canned advice for a raw wire label; unknown labels get the healthy entry.
pub fn demo_advice_for(label: &str) -> AdviceResponse {
    demo_advice(label.parse().unwrap_or(DiseaseLabel::HealthyLeaf))
}
