use crate::auth::Auth;
use crate::errors::HarnessError;
use crate::request::RequestBuilder;
use reqwest::Client as ReqwestClient;
use reqwest::Method;
use std::time::Duration;

/// Connect and total request timeout applied unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(160_000);

const BASE_URI_ENV: &str = "REST_HARNESS_BASE_URI";
const BASE_PATH_ENV: &str = "REST_HARNESS_BASE_PATH";
const TIMEOUT_ENV: &str = "REST_HARNESS_TIMEOUT_MS";

/// Target configuration and HTTP client shared by every request.
///
/// `Client` is an immutable value: the `with_*` methods return an updated
/// copy, and each request borrows the client for exactly one dispatch.
/// Cloning is cheap since the underlying connection pool is shared.
///
/// # Example
///
/// ```no_run
/// use rest_harness::{Auth, Client};
///
/// # async fn example() -> Result<(), rest_harness::HarnessError> {
/// let client = Client::builder()
///     .base_uri("https://api.example.com")
///     .base_path("/v2/users")
///     .auth(Auth::bearer("token"))
///     .build()?;
///
/// let response = client.get().send().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    #[allow(clippy::struct_field_names)]
    pub(crate) http_client: ReqwestClient,
    pub(crate) timeout: Duration,
    base_uri: Option<String>,
    base_path: Option<String>,
    auth: Auth,
}

/// Builder for `Client` instances.
#[derive(Debug)]
pub struct ClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    base_uri: Option<String>,
    base_path: Option<String>,
    auth: Auth,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_TIMEOUT,
            base_uri: None,
            base_path: None,
            auth: Auth::None,
        }
    }
}

impl ClientBuilder {
    /// Starts from the environment.
    ///
    /// Reads `REST_HARNESS_BASE_URI`, `REST_HARNESS_BASE_PATH` and
    /// `REST_HARNESS_TIMEOUT_MS` (applied to both connect and total
    /// timeout). Unset variables leave the defaults in place; an unparsable
    /// timeout is logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut builder = Self::default();

        if let Ok(uri) = std::env::var(BASE_URI_ENV) {
            builder = builder.base_uri(uri);
        }
        if let Ok(path) = std::env::var(BASE_PATH_ENV) {
            builder = builder.base_path(path);
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match parse_timeout_ms(&raw) {
                Some(timeout) => {
                    builder = builder.timeout(timeout).connect_timeout(timeout);
                }
                None => tracing::warn!("Ignoring {TIMEOUT_ENV}={raw:?}: not a millisecond count"),
            }
        }

        builder
    }

    /// Sets the total request timeout, from connect to the last body byte.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum time to wait for a connection to be established.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Builds the `Client`.
    ///
    /// The base URI and base path follow the same rules as
    /// [`Client::with_base_uri`] and [`Client::with_base_path`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ClientBuild`] if the HTTP client cannot be
    /// created (e.g. the TLS backend fails to initialize).
    pub fn build(self) -> Result<Client, HarnessError> {
        let http_client = ReqwestClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| HarnessError::ClientBuild(e.to_string()))?;

        let mut client = Client {
            http_client,
            timeout: self.timeout,
            base_uri: None,
            base_path: None,
            auth: self.auth,
        };
        if let Some(uri) = self.base_uri {
            client = client.with_base_uri(uri);
        }
        if let Some(path) = self.base_path {
            client = client.with_base_path(path);
        }
        Ok(client)
    }
}

fn parse_timeout_ms(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}

impl Client {
    /// Creates a new builder with the default timeouts and no target.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn new() -> Result<Self, HarnessError> {
        Self::builder().build()
    }

    /// Sets the base URI (scheme, host and optional prefix).
    ///
    /// Blank input is ignored. The value is trimmed. Switching to a different
    /// base URI clears the base path, which only made sense under the old one.
    #[must_use]
    pub fn with_base_uri(mut self, uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref().trim();
        if uri.is_empty() {
            return self;
        }
        if self.base_uri.as_deref().is_some_and(|current| current != uri) {
            tracing::debug!("Base URI changed to {uri}, clearing base path");
            self.base_path = None;
        }
        self.base_uri = Some(uri.to_string());
        self
    }

    /// Sets the path appended to the base URI.
    ///
    /// Ignored when no base URI is set or when the path is blank.
    #[must_use]
    pub fn with_base_path(mut self, path: impl AsRef<str>) -> Self {
        let path = path.as_ref().trim();
        if self.base_uri.is_none() || path.is_empty() {
            return self;
        }
        self.base_path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    #[must_use]
    pub const fn auth(&self) -> &Auth {
        &self.auth
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URI followed by the base path, or `None` without a base URI.
    #[must_use]
    pub fn endpoint(&self) -> Option<String> {
        let base_uri = self.base_uri.as_deref()?;
        Some(match self.base_path.as_deref() {
            Some(path) => format!("{base_uri}{path}"),
            None => base_uri.to_string(),
        })
    }

    /// Starts a request with the given method.
    ///
    /// The call site is recorded and used as the caller label in exchange
    /// logs unless [`RequestBuilder::label`] overrides it.
    #[track_caller]
    #[must_use]
    pub fn request(&self, method: Method) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, std::panic::Location::caller())
    }

    #[track_caller]
    #[must_use]
    pub fn get(&self) -> RequestBuilder<'_> {
        self.request(Method::GET)
    }

    #[track_caller]
    #[must_use]
    pub fn post(&self) -> RequestBuilder<'_> {
        self.request(Method::POST)
    }

    #[track_caller]
    #[must_use]
    pub fn put(&self) -> RequestBuilder<'_> {
        self.request(Method::PUT)
    }

    #[track_caller]
    #[must_use]
    pub fn patch(&self) -> RequestBuilder<'_> {
        self.request(Method::PATCH)
    }

    #[track_caller]
    #[must_use]
    pub fn delete(&self) -> RequestBuilder<'_> {
        self.request(Method::DELETE)
    }

    #[track_caller]
    #[must_use]
    pub fn head(&self) -> RequestBuilder<'_> {
        self.request(Method::HEAD)
    }

    #[track_caller]
    #[must_use]
    pub fn options(&self) -> RequestBuilder<'_> {
        self.request(Method::OPTIONS)
    }
}
