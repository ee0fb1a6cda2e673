//! # rest-harness
//!
//! A fluent HTTP request builder for API test suites.
//!
//! A [`Client`] holds the target (base URI, base path), the authentication
//! descriptor and the timeouts. Each request is started from the client,
//! configured with a [`Payload`], headers and a [`ContentType`], then sent.
//! Every exchange is logged as one delimited block through `tracing`, and
//! responses can be decoded into typed values from JSON or XML.
//!
//! Dispatch never panics and never propagates: `send`, `send_json` and
//! `send_xml` log the failure at error level and return `None`. Use
//! [`RequestBuilder::try_send`] when the error itself matters.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rest_harness::{Auth, Client};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     email: String,
//! }
//!
//! # async fn example() -> Result<(), rest_harness::HarnessError> {
//! let client = Client::builder()
//!     .base_uri("https://api.example.com")
//!     .base_path("/v1/users")
//!     .auth(Auth::preemptive("qa-bot", "secret"))
//!     .build()?;
//!
//! // GET https://api.example.com/v1/users?email=a%40b.io&active=true
//! let users: Option<Vec<User>> = client
//!     .get()
//!     .params("email=a@b.io,active=true")
//!     .send_json()
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Params
//!
//! Query, form and generic params are [`ParamMap`]s. They can be built
//! directly, parsed from `key=value,key=value` text with
//! [`parse_param_string`], or flattened from any `Serialize` struct with
//! [`object_to_param_map`] / [`ParamSource::object`].
//!
//! ## Wire debugging
//!
//! Set `REST_HARNESS_WIRE=1` to echo every exchange to stderr with colors and
//! pretty-printed JSON, in addition to the `tracing` output.

pub mod auth;
pub mod client;
pub mod content_type;
pub mod errors;
pub mod params;
pub mod payload;
pub mod request;
pub mod response;
pub mod wire;

pub use auth::Auth;
pub use client::{Client, ClientBuilder, DEFAULT_TIMEOUT};
pub use content_type::{
    APPLICATION_JSON, APPLICATION_JSON_UTF8, APPLICATION_XML, CONTENT_TYPE_KEY, ContentType,
};
pub use errors::HarnessError;
pub use params::{ParamMap, object_to_param_map, parse_param_string};
pub use payload::{BodyKind, ObjectMapper, ParamSource, Payload};
pub use request::RequestBuilder;
pub use response::Response;
pub use wire::{ExchangeReport, NO_BASE_PATH, NO_BODY};

pub use reqwest::{Method, StatusCode};
