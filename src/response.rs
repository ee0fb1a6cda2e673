use crate::errors::HarnessError;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// A completed HTTP exchange with its body already read.
///
/// The body is captured as text during dispatch so it can be logged; decode
/// it with [`json`](Self::json) or [`xml`](Self::xml).
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: String,
    body: String,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, url: String, body: String) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    /// Reads status, headers and body out of a reqwest response.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.text().await?;
        Ok(Self::new(status, headers, url, body))
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Final URL of the exchange, including the encoded query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.body
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Json`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HarnessError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Deserializes the body as XML.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Xml`] if the body does not match `T`.
    pub fn xml<T: DeserializeOwned>(&self) -> Result<T, HarnessError> {
        quick_xml::de::from_str(&self.body).map_err(|e| HarnessError::Xml(e.to_string()))
    }
}
