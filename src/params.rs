//! Parameter maps for query, form and generic request params.
//!
//! A [`ParamMap`] keeps keys in first-encounter order and collects repeated
//! keys into one ordered value list. Values are `Option<String>` so a literal
//! null (`None`) stays distinguishable from an empty string.

use crate::errors::HarnessError;
use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

/// Ordered multi-map from param name to its values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, Vec<Option<String>>)>,
}

impl ParamMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a value under `key`, creating the key on first use.
    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Fluent form of [`push`](Self::push) for a present value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, Some(value.into()));
        self
    }

    /// Fluent form of [`push`](Self::push) for a literal null.
    #[must_use]
    pub fn with_null(mut self, key: impl Into<String>) -> Self {
        self.push(key, None);
        self
    }

    /// Returns the values recorded for `key`, in insertion order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Option<String>]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in first-encounter order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates `(key, values)` in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    /// Flattens the map into one `(key, value)` pair per recorded value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().flat_map(|(k, values)| {
            values
                .iter()
                .map(move |value| (k.as_str(), value.as_deref()))
        })
    }

    /// Moves every value of `other` into this map, keeping `other`'s order.
    pub fn merge(&mut self, other: ParamMap) {
        for (key, values) in other.entries {
            for value in values {
                self.push(key.clone(), value);
            }
        }
    }

    /// Percent-encodes the map as `application/x-www-form-urlencoded` text.
    ///
    /// Present values render as `key=value` (`key=` when empty); `None`
    /// renders as a bare `key`.
    #[must_use]
    pub fn to_urlencoded(&self) -> String {
        self.pairs()
            .map(|(key, value)| match value {
                Some(value) => format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                ),
                None => urlencoding::encode(key).into_owned(),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.push(key, value);
        }
        map
    }
}

impl Serialize for ParamMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Parses `key1=val1,key2=val2,key1=val3` into a [`ParamMap`].
///
/// - Segments are split on `,`, then on the first `=` only, so values may
///   contain `=` (URLs with query strings survive intact).
/// - Keys and values are trimmed.
/// - A value that is exactly `null` after trimming becomes `None`.
/// - A segment without `=` records `""` for its key.
/// - Segments that are blank after trimming, including a trailing one after a
///   final `,`, are skipped. A trailing empty value (`email=`) is kept as `""`.
///
/// ```
/// use rest_harness::parse_param_string;
///
/// let params = parse_param_string("email=hello,email=,email=null,id=1");
/// assert_eq!(
///     params.get("email"),
///     Some(&[Some("hello".to_string()), Some(String::new()), None][..])
/// );
/// assert_eq!(params.get("id"), Some(&[Some("1".to_string())][..]));
/// ```
#[must_use]
pub fn parse_param_string(input: &str) -> ParamMap {
    let mut map = ParamMap::new();

    for segment in input.split(',') {
        if segment.trim().is_empty() {
            continue;
        }

        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (segment.trim(), ""),
        };

        let value = if value == "null" {
            None
        } else {
            Some(value.to_string())
        };
        map.push(key, value);
    }

    map
}

/// Converts a typed value into a flat [`ParamMap`] via its JSON form.
///
/// # Errors
///
/// Returns [`HarnessError::Json`] if the value cannot be serialized and
/// [`HarnessError::InvalidInput`] if it does not serialize to a JSON object.
pub fn object_to_param_map<T: Serialize + ?Sized>(value: &T) -> Result<ParamMap, HarnessError> {
    value_to_param_map(serde_json::to_value(value)?)
}

/// Flattens a JSON object into a [`ParamMap`].
///
/// Strings are kept verbatim, numbers and booleans use their JSON text,
/// `null` becomes `None`, arrays contribute one value per element and nested
/// objects are kept as compact JSON.
pub(crate) fn value_to_param_map(value: Value) -> Result<ParamMap, HarnessError> {
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(HarnessError::InvalidInput(format!(
                "params object must serialize to a JSON object, got {}",
                json_type_name(&other)
            )));
        }
    };

    let mut map = ParamMap::new();
    for (key, field) in fields {
        match field {
            Value::Array(items) => {
                for item in items {
                    map.push(key.clone(), scalar_text(item));
                }
            }
            other => map.push(key, scalar_text(other)),
        }
    }
    Ok(map)
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
