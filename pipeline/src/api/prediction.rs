use shared::{ApiError, PredictRequest, PredictionResult};
use url::Url;

use crate::api::transport::{HttpTransport, normalize_request_error};
use crate::config::Config;
use crate::demo::{self, PREDICTION_DELAY_MS, SharedEntropy};
use crate::upload::EncodedImage;

pub const PREDICTION_SERVER_MESSAGE: &str = "The server did not respond. Please try again";

/// Classifies an uploaded image, either against the model endpoint or
/// locally with canned results. The variant is fixed at construction.
pub enum PredictionClient {
    Live(LivePrediction),
    Simulated(SimulatedPrediction),
}

pub struct LivePrediction {
    transport: HttpTransport,
    endpoint: Url,
}

pub struct SimulatedPrediction {
    results: Vec<PredictionResult>,
    entropy: SharedEntropy,
}

impl PredictionClient {
    /// Live when an endpoint is configured, simulated otherwise.
    pub fn new(endpoint: Option<Url>, transport: HttpTransport, entropy: SharedEntropy) -> Self {
        match endpoint {
            Some(endpoint) => PredictionClient::Live(LivePrediction::new(transport, endpoint)),
            None => PredictionClient::Simulated(SimulatedPrediction::new(entropy)),
        }
    }

    pub fn from_config(config: &Config, transport: HttpTransport, entropy: SharedEntropy) -> Self {
        Self::new(config.prediction_url.clone(), transport, entropy)
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, PredictionClient::Simulated(_))
    }

    pub async fn predict(&self, image: &EncodedImage) -> Result<PredictionResult, ApiError> {
        match self {
            PredictionClient::Live(live) => live.predict(image).await,
            PredictionClient::Simulated(simulated) => Ok(simulated.predict().await),
        }
    }
}

impl LivePrediction {
    pub fn new(transport: HttpTransport, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub async fn predict(&self, image: &EncodedImage) -> Result<PredictionResult, ApiError> {
        log::info!(
            "Requesting prediction for image {} from {}",
            image.fingerprint(),
            self.endpoint
        );

        let request = PredictRequest::new(image.as_str());
        match self
            .transport
            .post_json::<_, PredictionResult>(&self.endpoint, &request)
            .await
        {
            Ok(result) => {
                log::info!(
                    "Prediction received: {} ({} ms, model {})",
                    result.label,
                    result.latency_ms,
                    result.model_version
                );
                Ok(result)
            }
            Err(e) => {
                log::error!("Prediction request failed: {}", e);
                Err(normalize_request_error(e, PREDICTION_SERVER_MESSAGE))
            }
        }
    }
}

impl SimulatedPrediction {
    pub fn new(entropy: SharedEntropy) -> Self {
        Self::with_results(demo::demo_predictions(), entropy)
    }

    /// An empty set falls back to the built-in demo results.
    pub fn with_results(results: Vec<PredictionResult>, entropy: SharedEntropy) -> Self {
        let results = if results.is_empty() {
            demo::demo_predictions()
        } else {
            results
        };
        Self { results, entropy }
    }

    pub fn results(&self) -> &[PredictionResult] {
        &self.results
    }

    /// Never touches the network and cannot fail.
    pub async fn predict(&self) -> PredictionResult {
        let delay = demo::simulate_latency(&self.entropy, PREDICTION_DELAY_MS).await;
        let index = demo::pick_index(&self.entropy, self.results.len());
        let result = self.results[index].clone();
        log::info!(
            "Demo mode: returning simulated prediction {} after {:?}",
            result.label,
            delay
        );
        result
    }
}
