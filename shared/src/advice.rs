use serde::{Deserialize, Serialize};

use crate::Probabilities;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub title: String,
    pub bullets: Vec<String>,
    pub disclaimer: String,
}

/// Body of `POST <advice base>/advise`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub diagnosis: String,
    pub probs: Probabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_omitted_when_absent() {
        let request = AdviceRequest {
            diagnosis: "LEAF_BLIGHT".into(),
            probs: Probabilities::from([("LEAF_BLIGHT".to_string(), 0.9)]),
            question: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("question").is_none());
        assert_eq!(json["diagnosis"], "LEAF_BLIGHT");
    }
}
