use shared::{AdviceResponse, ApiError, PredictionResult};

use crate::api::{AdviceClient, HttpTransport, PredictionClient};
use crate::config::{CompressionConfig, Config, ConfigError};
use crate::demo::{Entropy, RngEntropy, SharedEntropy, shared_entropy};
use crate::session::Session;
use crate::upload::{ImageFile, encode_upload};

/// Drives a [`Session`] through upload, prediction and advice using the
/// clients selected from configuration.
pub struct DiagnosisService {
    prediction: PredictionClient,
    advice: AdviceClient,
    compression: Option<CompressionConfig>,
}

impl DiagnosisService {
    pub fn new(
        prediction: PredictionClient,
        advice: AdviceClient,
        compression: Option<CompressionConfig>,
    ) -> Self {
        Self {
            prediction,
            advice,
            compression,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::with_entropy(config, RngEntropy::from_os())
    }

    /// Same as [`from_config`](Self::from_config) with a chosen source for
    /// demo-mode randomness.
    pub fn with_entropy(
        config: &Config,
        entropy: impl Entropy + 'static,
    ) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config.api_key.clone(), config.request_timeout)?;
        let entropy: SharedEntropy = shared_entropy(entropy);

        let prediction = PredictionClient::from_config(config, transport.clone(), entropy.clone());
        let advice = AdviceClient::from_config(config, transport, entropy)?;

        if prediction.is_simulated() {
            log::warn!("No model endpoint configured, predictions are simulated");
        }
        if advice.is_simulated() {
            log::warn!("Advice endpoint not configured, advice is simulated");
        }

        Ok(Self::new(prediction, advice, config.compression))
    }

    pub fn is_demo_mode(&self) -> bool {
        self.prediction.is_simulated()
    }

    pub fn prediction(&self) -> &PredictionClient {
        &self.prediction
    }

    pub fn advice(&self) -> &AdviceClient {
        &self.advice
    }

    /// Validates and encodes a new image for the session. Encoding runs on
    /// the blocking pool since recompression is CPU bound.
    pub async fn upload(&self, session: &mut Session, file: ImageFile) -> Result<(), ApiError> {
        let ticket = session.begin_upload(&file)?;
        let name = file.name.clone();
        let compression = self.compression;

        let outcome =
            match tokio::task::spawn_blocking(move || encode_upload(&file, compression)).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Encoding task failed: {}", e);
                    session.clear_image();
                    return Err(ApiError::unknown(e.to_string()));
                }
            };

        let error = outcome.as_ref().err().map(ApiError::from);
        session.finish_upload(ticket, name, outcome);
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Runs a prediction for the session's image, then fetches advice for
    /// the result. Advice failure is recorded on the session and does not
    /// fail the call.
    pub async fn analyze(&self, session: &mut Session) -> Result<PredictionResult, ApiError> {
        let ticket = session.begin_analysis()?;
        let outcome = self.prediction.predict(ticket.image()).await;
        session.finish_analysis(ticket, outcome.clone());
        let result = outcome?;

        if let Err(e) = self.request_advice(session, None).await {
            log::warn!("Session {}: automatic advice failed: {}", session.id(), e);
        }

        Ok(result)
    }

    /// Asks a follow-up question about the current result.
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
    ) -> Result<AdviceResponse, ApiError> {
        self.request_advice(session, Some(question)).await
    }

    async fn request_advice(
        &self,
        session: &mut Session,
        question: Option<&str>,
    ) -> Result<AdviceResponse, ApiError> {
        let ticket = session.begin_advice(question)?;
        let outcome = self
            .advice
            .advise(ticket.label(), ticket.probs(), ticket.question())
            .await;
        session.finish_advice(ticket, outcome.clone());
        outcome
    }
}
