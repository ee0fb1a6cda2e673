use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building or dispatching a request.
///
/// The `send*` family on [`RequestBuilder`](crate::RequestBuilder) never
/// returns these: failures are logged at error level and collapse to `None`.
/// Use [`RequestBuilder::try_send`](crate::RequestBuilder::try_send) to get
/// the error itself.
///
/// # Example
///
/// ```ignore
/// match client.get().try_send().await {
///     Err(HarnessError::Timeout(after)) => {
///         tracing::warn!("gave up after {after:?}");
///     }
///     Err(HarnessError::InvalidInput(reason)) => {
///         tracing::error!("request was never sent: {reason}");
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HarnessError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// XML encoding or decoding failed.
    #[error("XML error: {0}")]
    Xml(String),
    /// The request could not be assembled from the supplied configuration,
    /// for example a missing base URI or an invalid header name.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Request exceeded the timeout configured on the client.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Failed to build the underlying HTTP client.
    ///
    /// This typically only occurs in exceptional circumstances such as
    /// TLS backend initialization failures.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl HarnessError {
    /// Maps a transport error to [`HarnessError::Timeout`] when reqwest
    /// reports it as one, keeping every other error as [`HarnessError::Http`].
    pub(crate) fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Http(error)
        }
    }
}
