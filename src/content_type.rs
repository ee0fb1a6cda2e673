//! Content types understood by the request builder.

use std::fmt;

/// Header name used for content negotiation.
pub const CONTENT_TYPE_KEY: &str = "Content-Type";
/// JSON media type as commonly sent by legacy test suites.
pub const APPLICATION_JSON: &str = "application/JSON";
pub const APPLICATION_XML: &str = "application/xml";
pub const APPLICATION_JSON_UTF8: &str = "application/json;charset=utf-8";

/// Content type applied to an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Any,
    Text,
    Json,
    Xml,
    Html,
    UrlEncoded,
    Binary,
    /// Any other media type, sent verbatim.
    Custom(String),
}

impl ContentType {
    /// Returns the `Content-Type` header value for this type.
    #[must_use]
    pub fn header_value(&self) -> &str {
        match self {
            Self::Any => "*/*",
            Self::Text => "text/plain",
            Self::Json => "application/json",
            Self::Xml => APPLICATION_XML,
            Self::Html => "text/html",
            Self::UrlEncoded => "application/x-www-form-urlencoded",
            Self::Binary => "application/octet-stream",
            Self::Custom(value) => value.as_str(),
        }
    }
}

impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        Self::Custom(value.to_string())
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        Self::Custom(value)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values() {
        assert_eq!(ContentType::Json.header_value(), "application/json");
        assert_eq!(ContentType::Xml.header_value(), "application/xml");
        assert_eq!(
            ContentType::UrlEncoded.header_value(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(ContentType::Any.to_string(), "*/*");
    }

    #[test]
    fn test_custom_passthrough() {
        let ct = ContentType::from(APPLICATION_JSON_UTF8);
        assert_eq!(ct.header_value(), "application/json;charset=utf-8");
        assert_eq!(ct, ContentType::Custom(APPLICATION_JSON_UTF8.to_string()));
    }
}
