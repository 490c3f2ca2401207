use shared::{AdviceResponse, ApiError, ErrorKind, PredictionResult, ProcessingState, Probabilities};
use thiserror::Error;
use uuid::Uuid;

use crate::upload::{EncodedImage, EncodingError, ImageFile, ValidationError, validate_image_file};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),
    #[error("Please select an image first")]
    NoImage,
    #[error("An analysis is already running")]
    Busy,
    #[error("No diagnosis is available yet")]
    NoResult,
    #[error("Advice is already being prepared")]
    AdviceInFlight,
    #[error("Please type a question first")]
    EmptyQuestion,
    #[error("Report download is not available yet")]
    ReportUnavailable,
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Rejected(e) => e.into(),
            other => ApiError::new(ErrorKind::Validation, other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub name: String,
    pub encoded: EncodedImage,
}

/// Issued by [`Session::begin_upload`]; hand it back with the encoding outcome.
#[derive(Debug)]
pub struct UploadTicket {
    generation: u64,
}

/// Issued by [`Session::begin_analysis`] with the image to send.
#[derive(Debug)]
pub struct AnalysisTicket {
    generation: u64,
    image: EncodedImage,
}

impl AnalysisTicket {
    pub fn image(&self) -> &EncodedImage {
        &self.image
    }
}

/// Issued by [`Session::begin_advice`] with everything the advice call needs.
#[derive(Debug)]
pub struct AdviceTicket {
    generation: u64,
    advice_generation: u64,
    label: String,
    probs: Probabilities,
    question: Option<String>,
}

impl AdviceTicket {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn probs(&self) -> &Probabilities {
        &self.probs
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }
}

/// State of one user's diagnosis session.
///
/// Long-running work is split into `begin_*`/`finish_*` pairs so a UI can
/// render the intermediate state while the call is outstanding. Tickets carry
/// the image generation they were issued for; an outcome arriving after the
/// image was replaced or cleared is dropped.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: ProcessingState,
    image: Option<SelectedImage>,
    result: Option<PredictionResult>,
    advice: Option<AdviceResponse>,
    advice_loading: bool,
    advice_error: Option<ApiError>,
    last_error: Option<ApiError>,
    generation: u64,
    advice_generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ProcessingState::Idle,
            image: None,
            result: None,
            advice: None,
            advice_loading: false,
            advice_error: None,
            last_error: None,
            generation: 0,
            advice_generation: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn advice(&self) -> Option<&AdviceResponse> {
        self.advice.as_ref()
    }

    pub fn is_advice_loading(&self) -> bool {
        self.advice_loading
    }

    pub fn advice_error(&self) -> Option<&ApiError> {
        self.advice_error.as_ref()
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ProcessingState::Uploading | ProcessingState::Processing
        )
    }

    pub fn can_analyze(&self) -> bool {
        self.image.is_some() && !self.is_busy()
    }

    fn set_state(&mut self, state: ProcessingState) {
        if self.state != state {
            log::debug!("Session {}: {} -> {}", self.id, self.state, state);
            self.state = state;
        }
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.advice_generation += 1;
        self.image = None;
        self.result = None;
        self.advice = None;
        self.advice_loading = false;
        self.advice_error = None;
        self.last_error = None;
    }

    /// Validates a new file and discards the current image, result and
    /// advice. A rejected file leaves the session untouched.
    pub fn begin_upload(&mut self, file: &ImageFile) -> Result<UploadTicket, SessionError> {
        if self.state == ProcessingState::Processing {
            return Err(SessionError::Busy);
        }
        if let Err(e) = validate_image_file(&file.mime_type, file.size()) {
            log::warn!("Session {}: rejected {}: {}", self.id, file.name, e);
            return Err(e.into());
        }

        self.reset();
        self.set_state(ProcessingState::Uploading);
        Ok(UploadTicket {
            generation: self.generation,
        })
    }

    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        name: impl Into<String>,
        outcome: Result<EncodedImage, EncodingError>,
    ) -> bool {
        if ticket.generation != self.generation || self.state != ProcessingState::Uploading {
            log::warn!("Session {}: dropping stale upload", self.id);
            return false;
        }

        match outcome {
            Ok(encoded) => {
                log::info!("Session {}: image {} ready", self.id, encoded.fingerprint());
                self.image = Some(SelectedImage {
                    name: name.into(),
                    encoded,
                });
                self.set_state(ProcessingState::Idle);
            }
            Err(e) => {
                log::error!("Session {}: could not encode upload: {}", self.id, e);
                self.last_error = Some(e.into());
                self.set_state(ProcessingState::Error);
            }
        }
        true
    }

    pub fn clear_image(&mut self) {
        self.reset();
        self.set_state(ProcessingState::Idle);
    }

    /// Starts a prediction for the current image. Any previous result and
    /// advice are dropped.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        let image = self
            .image
            .as_ref()
            .map(|selected| selected.encoded.clone())
            .ok_or(SessionError::NoImage)?;

        self.advice_generation += 1;
        self.result = None;
        self.advice = None;
        self.advice_loading = false;
        self.advice_error = None;
        self.last_error = None;
        self.set_state(ProcessingState::Processing);

        Ok(AnalysisTicket {
            generation: self.generation,
            image,
        })
    }

    pub fn finish_analysis(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<PredictionResult, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation || self.state != ProcessingState::Processing {
            log::warn!("Session {}: dropping stale prediction", self.id);
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.set_state(ProcessingState::Success);
            }
            Err(e) => {
                self.last_error = Some(e);
                self.set_state(ProcessingState::Error);
            }
        }
        true
    }

    /// Starts an advice request for the current result. A question, when
    /// given, is trimmed and must not be empty.
    pub fn begin_advice(&mut self, question: Option<&str>) -> Result<AdviceTicket, SessionError> {
        let result = match (&self.result, self.state) {
            (Some(result), ProcessingState::Success) => result,
            _ => return Err(SessionError::NoResult),
        };
        if self.advice_loading {
            return Err(SessionError::AdviceInFlight);
        }
        let question = match question.map(str::trim) {
            Some("") => return Err(SessionError::EmptyQuestion),
            other => other.map(str::to_string),
        };

        let ticket = AdviceTicket {
            generation: self.generation,
            advice_generation: self.advice_generation + 1,
            label: result.label.clone(),
            probs: result.probs.clone(),
            question,
        };
        self.advice_generation += 1;
        self.advice_loading = true;
        self.advice_error = None;
        Ok(ticket)
    }

    /// Records an advice outcome. A failure keeps any earlier advice and
    /// never leaves the `success` state.
    pub fn finish_advice(
        &mut self,
        ticket: AdviceTicket,
        outcome: Result<AdviceResponse, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation
            || ticket.advice_generation != self.advice_generation
            || self.state != ProcessingState::Success
        {
            log::warn!("Session {}: dropping stale advice", self.id);
            return false;
        }

        self.advice_loading = false;
        match outcome {
            Ok(advice) => self.advice = Some(advice),
            Err(e) => {
                log::warn!("Session {}: advice unavailable: {}", self.id, e);
                self.advice_error = Some(e);
            }
        }
        true
    }

    pub fn download_report(&self) -> Result<(), SessionError> {
        let result = self.result.as_ref().ok_or(SessionError::NoResult)?;
        log::info!(
            "Session {}: report requested for {}, not available yet",
            self.id,
            result.label
        );
        Err(SessionError::ReportUnavailable)
    }
}
