//! Authentication descriptors applied at dispatch time.

use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use std::fmt;

/// How a request authenticates against the target service.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// No credentials are sent.
    #[default]
    None,
    /// Basic auth answered on challenge: the request goes out without
    /// credentials and is replayed with them only if the server responds
    /// `401` with a `Basic` `WWW-Authenticate` challenge.
    Basic { username: String, password: String },
    /// Basic auth sent on the first request, without waiting for a challenge.
    PreemptiveBasic { username: String, password: String },
    /// `Authorization: Bearer <token>`.
    BearerToken(String),
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn preemptive(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::PreemptiveBasic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::BearerToken(token.into())
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short label used in exchange logs; never includes credentials.
    #[must_use]
    pub const fn scheme_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::PreemptiveBasic { .. } => "preemptive-basic",
            Self::BearerToken(_) => "bearer",
        }
    }

    /// Attaches credentials that go out on the first request.
    ///
    /// Challenge basic auth is not applied here; see
    /// [`Auth::challenge_credentials`].
    pub(crate) fn apply_upfront(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::PreemptiveBasic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            Self::BearerToken(token) => builder.bearer_auth(token),
            Self::None | Self::Basic { .. } => builder,
        }
    }

    /// Credentials to replay with after a `401` challenge, if this descriptor
    /// waits for one.
    pub(crate) fn challenge_credentials(&self) -> Option<(&str, &str)> {
        match self {
            Self::Basic { username, password } => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

// Credentials stay out of debug output.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::PreemptiveBasic { username, .. } => f
                .debug_struct("PreemptiveBasic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::BearerToken(_) => f.debug_tuple("BearerToken").field(&"***").finish(),
        }
    }
}

/// Returns `true` if the response headers carry a `Basic` auth challenge.
pub(crate) fn is_basic_challenge(headers: &HeaderMap) -> bool {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| {
            v.trim_start()
                .get(..5)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_default_is_none() {
        assert!(Auth::default().is_none());
        assert_eq!(Auth::default().scheme_name(), "none");
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            Auth::basic("u", "p"),
            Auth::Basic {
                username: "u".to_string(),
                password: "p".to_string()
            }
        );
        assert_eq!(Auth::preemptive("u", "p").scheme_name(), "preemptive-basic");
        assert_eq!(Auth::bearer("t"), Auth::BearerToken("t".to_string()));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", Auth::preemptive("alice", "hunter2"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));

        let debug = format!("{:?}", Auth::bearer("secret-token"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_challenge_credentials_only_for_basic() {
        assert_eq!(Auth::basic("u", "p").challenge_credentials(), Some(("u", "p")));
        assert_eq!(Auth::preemptive("u", "p").challenge_credentials(), None);
        assert_eq!(Auth::bearer("t").challenge_credentials(), None);
        assert_eq!(Auth::None.challenge_credentials(), None);
    }

    #[test]
    fn test_is_basic_challenge() {
        let mut headers = HeaderMap::new();
        assert!(!is_basic_challenge(&headers));

        headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer realm=\"api\""));
        assert!(!is_basic_challenge(&headers));

        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("basic realm=\"api\""));
        assert!(is_basic_challenge(&headers));
    }
}
