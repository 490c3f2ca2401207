use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiError;
use thiserror::Error;
use url::Url;

pub const CONNECTIVITY_MESSAGE: &str =
    "Cannot connect to the server. Please check your internet connection";

/// Transport-level outcome of a failed live call, before normalization.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("server responded with status {0}")]
    Status(StatusCode),
    #[error("server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            RequestError::Status(status)
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            RequestError::Unreachable(err)
        } else {
            RequestError::Other(err.to_string())
        }
    }
}

/// Maps a transport failure onto the shape shown to users. Status failures
/// keep the numeric code but not the server's text; unreachable servers get
/// the connectivity hint; everything else passes its message through.
pub fn normalize_request_error(err: RequestError, server_message: &str) -> ApiError {
    match err {
        RequestError::Status(status) => ApiError::server(server_message, status.as_u16()),
        RequestError::Unreachable(_) => ApiError::connectivity(CONNECTIVITY_MESSAGE),
        RequestError::Other(message) => ApiError::unknown(message),
    }
}

/// JSON-over-HTTP plumbing shared by the live clients.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Sends exactly one `POST`; there is no retry at this layer.
    pub async fn post_json<B, T>(&self, url: &Url, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http_client.post(url.clone()).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }
}
