//! Per-request builder and the dispatcher that executes it.

use crate::auth::is_basic_challenge;
use crate::client::Client;
use crate::content_type::ContentType;
use crate::errors::HarnessError;
use crate::payload::{BodyKind, ObjectMapper, Payload, ParamSource};
use crate::response::Response;
use crate::wire::{self, ExchangeReport};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::panic::Location;
use tracing::{debug, error, info};

/// Builder for a single request against a [`Client`]'s target.
///
/// Obtained from [`Client::request`] or one of its method shortcuts. The
/// builder is consumed by one of the dispatch methods:
///
/// - [`send`](Self::send): raw [`Response`], `None` on failure
/// - [`send_json`](Self::send_json) / [`send_xml`](Self::send_xml): decoded
///   body, `None` on failure
/// - [`try_send`](Self::try_send): the same dispatch, returning the error
///
/// Failures are always logged at error level before they are returned or
/// swallowed.
///
/// # Example
///
/// ```no_run
/// # use rest_harness::Client;
/// # async fn example(client: Client) {
/// let created = client
///     .post()
///     .form_params("email=hello,email=hi,id=1")
///     .header("X-Trace", "abc")
///     .send()
///     .await;
///
/// if let Some(response) = created {
///     assert_eq!(response.status_code(), 201);
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a Client,
    method: Method,
    payload: Result<Payload, HarnessError>,
    content_type: Option<ContentType>,
    headers: Vec<(String, String)>,
    label: Option<String>,
    location: &'static Location<'static>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(
        client: &'a Client,
        method: Method,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            client,
            method,
            payload: Ok(Payload::Empty),
            content_type: None,
            headers: Vec::new(),
            label: None,
            location,
        }
    }

    /// Sets the payload, replacing any previous one.
    #[must_use]
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Ok(payload);
        self
    }

    /// Sends `text` as the raw body.
    #[must_use]
    pub fn body(self, text: impl Into<String>) -> Self {
        self.payload(Payload::body(text))
    }

    /// Serializes `value` as a JSON body.
    ///
    /// A serialization failure is reported when the request is sent.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.payload = Payload::mapped(ObjectMapper::Json, value);
        self
    }

    /// Serializes `value` as an XML body.
    ///
    /// A serialization failure is reported when the request is sent.
    #[must_use]
    pub fn xml<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.payload = Payload::mapped(ObjectMapper::Xml, value);
        self
    }

    /// Sends params in the query string for GET, HEAD, DELETE and OPTIONS,
    /// and as a form body for every other method.
    #[must_use]
    pub fn params(self, source: impl Into<ParamSource>) -> Self {
        self.payload(Payload::params(source))
    }

    #[must_use]
    pub fn form_params(self, source: impl Into<ParamSource>) -> Self {
        self.payload(Payload::form_params(source))
    }

    #[must_use]
    pub fn query_params(self, source: impl Into<ParamSource>) -> Self {
        self.payload(Payload::query_params(source))
    }

    /// Sets the content type. Overrides a `Content-Type` passed through
    /// [`header`](Self::header) and any payload default.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<ContentType>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds a header. Names and values are validated at dispatch.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Overrides the caller label shown as "Running Method" in exchange logs.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label used for this request in logs: the explicit label, or the call
    /// site that started the request.
    #[must_use]
    pub fn caller_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.location.to_string())
    }

    /// Dispatches the request, logging the exchange or the failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be assembled (no base URI,
    /// invalid header, payload encoding), if the transport fails or times
    /// out, or if the response body cannot be read.
    pub async fn try_send(self) -> Result<Response, HarnessError> {
        let request_id = wire::next_request_id();
        let caller = self.caller_label();
        let method = self.method.clone();
        let endpoint = self
            .client
            .endpoint()
            .unwrap_or_else(|| "<no base URI>".to_string());

        let result = self.dispatch(request_id, &caller).await;
        if let Err(e) = &result {
            error!(
                caller = %caller,
                method = %method,
                endpoint = %endpoint,
                "Request failed: {e}"
            );
            wire::echo_failure(request_id, method.as_str(), &endpoint, e);
        }
        result
    }

    /// Dispatches the request and returns the raw response.
    ///
    /// Returns `None` if anything failed; the cause is in the error log.
    pub async fn send(self) -> Option<Response> {
        self.try_send().await.ok()
    }

    /// Dispatches the request and decodes a JSON response body into `T`.
    ///
    /// Returns `None` if the request or the decoding failed; both are logged.
    pub async fn send_json<T: DeserializeOwned>(self) -> Option<T> {
        let response = self.send().await?;
        response
            .json()
            .inspect_err(|e| error!(url = %response.url(), "Failed to decode JSON response: {e}"))
            .ok()
    }

    /// Dispatches the request and decodes an XML response body into `T`.
    ///
    /// Returns `None` if the request or the decoding failed; both are logged.
    pub async fn send_xml<T: DeserializeOwned>(self) -> Option<T> {
        let response = self.send().await?;
        response
            .xml()
            .inspect_err(|e| error!(url = %response.url(), "Failed to decode XML response: {e}"))
            .ok()
    }

    async fn dispatch(self, request_id: usize, caller: &str) -> Result<Response, HarnessError> {
        let client = self.client;
        let base_uri = client
            .base_uri()
            .ok_or_else(|| HarnessError::InvalidInput("no base URI configured".to_string()))?;
        let endpoint = client.endpoint().unwrap_or_else(|| base_uri.to_string());

        let payload = self.payload?;
        let body_kind = payload.kind();
        let encoded = EncodedPayload::encode(&self.method, payload)?;
        let url = append_query(&endpoint, encoded.query.as_deref());

        let mut headers = build_headers(&self.headers)?;
        match self.content_type.as_ref() {
            Some(content_type) => {
                headers.insert(CONTENT_TYPE, header_value(content_type.header_value())?);
            }
            None => {
                if let Some(default) = &encoded.default_content_type
                    && !headers.contains_key(CONTENT_TYPE)
                {
                    headers.insert(CONTENT_TYPE, header_value(default.header_value())?);
                }
            }
        }

        debug!(
            "Dispatching {} {url} (body kind {body_kind}, auth {})",
            self.method,
            client.auth().scheme_name()
        );

        let mut builder = client
            .http_client
            .request(self.method.clone(), &url)
            .headers(headers);
        if let Some(body) = encoded.body {
            builder = builder.body(body);
        }
        let builder = client.auth().apply_upfront(builder);
        let replay = client
            .auth()
            .challenge_credentials()
            .and_then(|(username, password)| {
                builder
                    .try_clone()
                    .map(|b| b.basic_auth(username, Some(password)))
            });

        let timeout = client.timeout;
        let mut response = builder
            .send()
            .await
            .map_err(|e| HarnessError::from_transport(e, timeout))?;

        if response.status() == StatusCode::UNAUTHORIZED
            && is_basic_challenge(response.headers())
            && let Some(replay) = replay
        {
            debug!("Basic auth challenge received, replaying with credentials");
            response = replay
                .send()
                .await
                .map_err(|e| HarnessError::from_transport(e, timeout))?;
        }

        let response = Response::read(response)
            .await
            .map_err(|e| HarnessError::from_transport(e, timeout))?;

        let report = ExchangeReport {
            caller,
            method: self.method.as_str(),
            body_kind,
            status_code: response.status_code(),
            base_uri,
            base_path: client.base_path(),
            endpoint: &endpoint,
            request: encoded.snapshot.as_deref(),
            response: response.text(),
        };
        info!("{report}");
        wire::echo_exchange(request_id, &report);

        Ok(response)
    }
}

/// A payload lowered to what goes on the wire.
#[derive(Debug, Default, PartialEq)]
struct EncodedPayload {
    query: Option<String>,
    body: Option<String>,
    default_content_type: Option<ContentType>,
    /// Request text as it appears in the exchange log.
    snapshot: Option<String>,
}

impl EncodedPayload {
    fn encode(method: &Method, payload: Payload) -> Result<Self, HarnessError> {
        let kind = payload.kind();
        match payload {
            Payload::Empty => Ok(Self::default()),
            Payload::Body(text) => Ok(Self {
                query: None,
                snapshot: Some(text.clone()),
                body: Some(text),
                default_content_type: Some(ContentType::Text),
            }),
            Payload::Mapped { mapper, text } => Ok(Self {
                query: None,
                snapshot: Some(text.clone()),
                body: Some(text),
                default_content_type: Some(mapper.default_content_type()),
            }),
            Payload::Params(source) | Payload::FormParams(source) | Payload::QueryParams(source) => {
                let map = source.into_param_map()?;
                let snapshot = Some(serde_json::to_string(&map)?);
                let encoded = map.to_urlencoded();
                let in_query = match kind {
                    BodyKind::QueryParams => true,
                    BodyKind::Params => sends_params_in_query(method),
                    _ => false,
                };

                if in_query {
                    Ok(Self {
                        query: Some(encoded),
                        snapshot,
                        ..Self::default()
                    })
                } else {
                    Ok(Self {
                        query: None,
                        body: Some(encoded),
                        default_content_type: Some(ContentType::UrlEncoded),
                        snapshot,
                    })
                }
            }
        }
    }
}

fn sends_params_in_query(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS
    )
}

fn append_query(endpoint: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => {
            let separator = if endpoint.contains('?') { '&' } else { '?' };
            format!("{endpoint}{separator}{query}")
        }
        _ => endpoint.to_string(),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, HarnessError> {
    HeaderValue::from_str(value)
        .map_err(|e| HarnessError::InvalidInput(format!("invalid header value {value:?}: {e}")))
}

fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, HarnessError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HarnessError::InvalidInput(format!("invalid header name {name:?}: {e}")))?;
        map.append(header_name, header_value(value)?);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamMap;
    use serde_json::json;

    #[test]
    fn test_encode_empty() {
        let encoded = EncodedPayload::encode(&Method::GET, Payload::Empty).unwrap();
        assert_eq!(encoded, EncodedPayload::default());
    }

    #[test]
    fn test_encode_raw_body() {
        let encoded = EncodedPayload::encode(&Method::POST, Payload::body("hello")).unwrap();
        assert_eq!(encoded.body.as_deref(), Some("hello"));
        assert_eq!(encoded.snapshot.as_deref(), Some("hello"));
        assert_eq!(encoded.default_content_type, Some(ContentType::Text));
        assert!(encoded.query.is_none());
    }

    #[test]
    fn test_encode_mapped_json() {
        let payload = Payload::json(&json!({"name": "Ada"})).unwrap();
        let encoded = EncodedPayload::encode(&Method::PUT, payload).unwrap();
        assert_eq!(encoded.body.as_deref(), Some(r#"{"name":"Ada"}"#));
        assert_eq!(encoded.default_content_type, Some(ContentType::Json));
    }

    #[test]
    fn test_encode_query_params() {
        let encoded = EncodedPayload::encode(
            &Method::POST,
            Payload::query_params("id=1,id=2,tag=null"),
        )
        .unwrap();
        assert_eq!(encoded.query.as_deref(), Some("id=1&id=2&tag"));
        assert!(encoded.body.is_none());
        assert_eq!(
            encoded.snapshot.as_deref(),
            Some(r#"{"id":["1","2"],"tag":[null]}"#)
        );
    }

    #[test]
    fn test_encode_form_params() {
        let map = ParamMap::new().with("user name", "a b");
        let encoded = EncodedPayload::encode(&Method::GET, Payload::form_params(map)).unwrap();
        assert_eq!(encoded.body.as_deref(), Some("user%20name=a%20b"));
        assert_eq!(encoded.default_content_type, Some(ContentType::UrlEncoded));
        assert!(encoded.query.is_none());
    }

    #[test]
    fn test_encode_params_follows_method() {
        let get = EncodedPayload::encode(&Method::GET, Payload::params("a=1")).unwrap();
        assert_eq!(get.query.as_deref(), Some("a=1"));
        assert!(get.body.is_none());

        let post = EncodedPayload::encode(&Method::POST, Payload::params("a=1")).unwrap();
        assert_eq!(post.body.as_deref(), Some("a=1"));
        assert!(post.query.is_none());
    }

    #[test]
    fn test_encode_object_params_rejects_non_object() {
        let payload = Payload::params(ParamSource::Object(json!([1, 2])));
        let err = EncodedPayload::encode(&Method::GET, payload).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidInput(_)));
    }

    #[test]
    fn test_append_query() {
        assert_eq!(append_query("http://a/b", None), "http://a/b");
        assert_eq!(append_query("http://a/b", Some("")), "http://a/b");
        assert_eq!(append_query("http://a/b", Some("x=1")), "http://a/b?x=1");
        assert_eq!(append_query("http://a/b?v=2", Some("x=1")), "http://a/b?v=2&x=1");
    }

    #[test]
    fn test_build_headers() {
        let headers = build_headers(&[
            ("X-One".to_string(), "1".to_string()),
            ("X-One".to_string(), "2".to_string()),
        ])
        .unwrap();
        assert_eq!(headers.get_all("x-one").iter().count(), 2);

        let err = build_headers(&[("bad header".to_string(), "v".to_string())]).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidInput(_)));

        let err = build_headers(&[("X-Ok".to_string(), "line\nbreak".to_string())]).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidInput(_)));
    }

    #[test]
    fn test_label_overrides_call_site() {
        let client = Client::new().unwrap();
        let builder = client.get();
        assert!(builder.caller_label().contains("request.rs"));
        assert_eq!(builder.label("create_user").caller_label(), "create_user");
    }

    #[test]
    fn test_json_serialization_error_is_deferred() {
        use std::collections::HashMap;

        let client = Client::new().unwrap();
        // tuple keys cannot be JSON object keys
        let mut bad = HashMap::new();
        bad.insert((1, 2), "x");
        let builder = client.post().json(&bad);
        assert!(matches!(builder.payload, Err(HarnessError::Json(_))));
    }
}
