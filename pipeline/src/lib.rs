pub mod api;
pub mod config;
pub mod demo;
pub mod service;
pub mod session;
pub mod upload;

pub use api::{AdviceClient, PredictionClient};
pub use config::{CompressionConfig, Config, ConfigError};
pub use service::DiagnosisService;
pub use session::{Session, SessionError};
pub use upload::{EncodedImage, ImageFile};
