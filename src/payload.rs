//! Request payloads and the body kinds that select their encoding.

use crate::content_type::ContentType;
use crate::errors::HarnessError;
use crate::params::{ParamMap, parse_param_string, value_to_param_map};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// How a payload is encoded into the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    /// Raw body, sent as given.
    Body,
    /// Body produced by an explicit [`ObjectMapper`].
    MappedBody,
    /// Query string for GET-like methods, form body otherwise.
    Params,
    FormParams,
    QueryParams,
}

impl BodyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Body => "BODY",
            Self::MappedBody => "MAPPED_BODY",
            Self::Params => "PARAMS",
            Self::FormParams => "FORM_PARAMS",
            Self::QueryParams => "QUERY_PARAMS",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Codec used to turn a typed value into a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectMapper {
    Json,
    Xml,
}

impl ObjectMapper {
    /// Content type sent when the caller does not set one.
    #[must_use]
    pub const fn default_content_type(self) -> ContentType {
        match self {
            Self::Json => ContentType::Json,
            Self::Xml => ContentType::Xml,
        }
    }

    fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<String, HarnessError> {
        match self {
            Self::Json => Ok(serde_json::to_string(value)?),
            Self::Xml => {
                quick_xml::se::to_string(value).map_err(|e| HarnessError::Xml(e.to_string()))
            }
        }
    }
}

/// Where param-style payload values come from.
///
/// The caller picks the variant; nothing is inferred from the runtime type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSource {
    /// Already-built map, used as is.
    Map(ParamMap),
    /// `key=value,key=value` text, parsed with [`parse_param_string`].
    Text(String),
    /// JSON object whose fields become params.
    Object(Value),
}

impl ParamSource {
    /// Captures a typed value as [`ParamSource::Object`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Json`] if the value cannot be serialized.
    pub fn object<T: Serialize + ?Sized>(value: &T) -> Result<Self, HarnessError> {
        Ok(Self::Object(serde_json::to_value(value)?))
    }

    pub(crate) fn into_param_map(self) -> Result<ParamMap, HarnessError> {
        match self {
            Self::Map(map) => Ok(map),
            Self::Text(text) => Ok(parse_param_string(&text)),
            Self::Object(value) => value_to_param_map(value),
        }
    }
}

impl From<ParamMap> for ParamSource {
    fn from(map: ParamMap) -> Self {
        Self::Map(map)
    }
}

impl From<&str> for ParamSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ParamSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A request payload tagged with the way it must be encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Body(String),
    Mapped {
        mapper: ObjectMapper,
        text: String,
    },
    Params(ParamSource),
    FormParams(ParamSource),
    QueryParams(ParamSource),
}

impl Payload {
    pub fn body(text: impl Into<String>) -> Self {
        Self::Body(text.into())
    }

    /// Serializes `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Json`] if serialization fails.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, HarnessError> {
        Self::mapped(ObjectMapper::Json, value)
    }

    /// Serializes `value` as an XML body.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Xml`] if serialization fails.
    pub fn xml<T: Serialize + ?Sized>(value: &T) -> Result<Self, HarnessError> {
        Self::mapped(ObjectMapper::Xml, value)
    }

    /// Serializes `value` with the given mapper.
    ///
    /// # Errors
    ///
    /// Returns the mapper's serialization error.
    pub fn mapped<T: Serialize + ?Sized>(
        mapper: ObjectMapper,
        value: &T,
    ) -> Result<Self, HarnessError> {
        Ok(Self::Mapped {
            mapper,
            text: mapper.encode(value)?,
        })
    }

    pub fn params(source: impl Into<ParamSource>) -> Self {
        Self::Params(source.into())
    }

    pub fn form_params(source: impl Into<ParamSource>) -> Self {
        Self::FormParams(source.into())
    }

    pub fn query_params(source: impl Into<ParamSource>) -> Self {
        Self::QueryParams(source.into())
    }

    #[must_use]
    pub const fn kind(&self) -> BodyKind {
        match self {
            Self::Empty => BodyKind::Empty,
            Self::Body(_) => BodyKind::Body,
            Self::Mapped { .. } => BodyKind::MappedBody,
            Self::Params(_) => BodyKind::Params,
            Self::FormParams(_) => BodyKind::FormParams,
            Self::QueryParams(_) => BodyKind::QueryParams,
        }
    }
}
