use shared::{AdviceRequest, AdviceResponse, ApiError, Probabilities};
use url::Url;

use crate::api::transport::{HttpTransport, normalize_request_error};
use crate::config::{Config, ConfigError};
use crate::demo::{self, ADVICE_DELAY_MS, SharedEntropy};

pub const ADVICE_SERVER_MESSAGE: &str = "Could not fetch advice. Please try again";

/// Care advice for a diagnosis, from the advice service or the canned table.
pub enum AdviceClient {
    Live(LiveAdvice),
    Simulated(SimulatedAdvice),
}

pub struct LiveAdvice {
    transport: HttpTransport,
    endpoint: Url,
}

pub struct SimulatedAdvice {
    entropy: SharedEntropy,
}

/// `<base>/advise`, tolerating a trailing slash on the base.
pub fn advise_url(base: &Url) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}/advise", base.as_str().trim_end_matches('/')))
}

impl AdviceClient {
    /// Live only when both the model endpoint and the advice endpoint are
    /// configured.
    pub fn from_config(
        config: &Config,
        transport: HttpTransport,
        entropy: SharedEntropy,
    ) -> Result<Self, ConfigError> {
        let base = match &config.advice_url {
            Some(base) if !config.is_advice_demo_mode() => base,
            _ => return Ok(AdviceClient::Simulated(SimulatedAdvice::new(entropy))),
        };
        let endpoint = advise_url(base).map_err(|source| ConfigError::InvalidUrl {
            key: "ADVICE_API_URL",
            source,
        })?;
        Ok(AdviceClient::Live(LiveAdvice::new(transport, endpoint)))
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, AdviceClient::Simulated(_))
    }

    pub async fn advise(
        &self,
        label: &str,
        probs: &Probabilities,
        question: Option<&str>,
    ) -> Result<AdviceResponse, ApiError> {
        match self {
            AdviceClient::Live(live) => live.advise(label, probs, question).await,
            AdviceClient::Simulated(simulated) => Ok(simulated.advise(label, question).await),
        }
    }
}

impl LiveAdvice {
    pub fn new(transport: HttpTransport, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn advise(
        &self,
        label: &str,
        probs: &Probabilities,
        question: Option<&str>,
    ) -> Result<AdviceResponse, ApiError> {
        let request = AdviceRequest {
            diagnosis: label.to_string(),
            probs: probs.clone(),
            // A blank question is the same as none.
            question: question
                .filter(|q| !q.trim().is_empty())
                .map(str::to_string),
        };

        log::info!("Requesting advice for {} from {}", label, self.endpoint);
        self.transport
            .post_json::<_, AdviceResponse>(&self.endpoint, &request)
            .await
            .map_err(|e| {
                log::error!("Advice request failed: {}", e);
                normalize_request_error(e, ADVICE_SERVER_MESSAGE)
            })
    }
}

impl SimulatedAdvice {
    pub fn new(entropy: SharedEntropy) -> Self {
        Self { entropy }
    }

    /// The follow-up question does not change the canned answer.
    pub async fn advise(&self, label: &str, question: Option<&str>) -> AdviceResponse {
        let delay = demo::simulate_latency(&self.entropy, ADVICE_DELAY_MS).await;
        log::info!(
            "Demo mode: returning simulated advice for {} after {:?} (question: {})",
            label,
            delay,
            question.is_some()
        );
        demo::demo_advice_for(label)
    }
}
