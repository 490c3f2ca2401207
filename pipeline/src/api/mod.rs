pub mod advice;
pub mod prediction;
pub mod transport;

pub use advice::AdviceClient;
pub use prediction::PredictionClient;
pub use transport::{
    CONNECTIVITY_MESSAGE, HttpTransport, RequestError, normalize_request_error,
};
