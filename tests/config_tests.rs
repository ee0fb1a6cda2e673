//! Environment-driven client configuration.
//!
//! Kept in its own test binary with a single test: it mutates process-wide
//! environment variables.

use rest_harness::ClientBuilder;
use std::time::Duration;

#[test]
fn test_client_builder_from_env() {
    // SAFETY: this is the only test in this binary, so no other thread reads
    // the environment concurrently.
    unsafe {
        std::env::set_var("REST_HARNESS_BASE_URI", "  http://qa.internal:8080 ");
        std::env::set_var("REST_HARNESS_BASE_PATH", "/api");
        std::env::set_var("REST_HARNESS_TIMEOUT_MS", "2500");
    }

    let client = ClientBuilder::from_env().build().unwrap();
    assert_eq!(client.base_uri(), Some("http://qa.internal:8080"));
    assert_eq!(client.base_path(), Some("/api"));
    assert_eq!(client.timeout(), Duration::from_millis(2500));
    assert_eq!(client.endpoint().as_deref(), Some("http://qa.internal:8080/api"));

    // SAFETY: as above.
    unsafe {
        std::env::set_var("REST_HARNESS_TIMEOUT_MS", "later");
        std::env::remove_var("REST_HARNESS_BASE_PATH");
    }

    let client = ClientBuilder::from_env().build().unwrap();
    assert_eq!(client.timeout(), rest_harness::DEFAULT_TIMEOUT);
    assert_eq!(client.base_path(), None);
}
