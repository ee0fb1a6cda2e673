//! Exchange reports and wire-level debugging.
//!
//! Every dispatch produces an [`ExchangeReport`], logged at info level
//! through `tracing`. When `REST_HARNESS_WIRE` is set to any value, the same
//! exchange is also echoed to stderr with colors and pretty-printed JSON.
//!
//! ```bash
//! REST_HARNESS_WIRE=1 cargo test -- --nocapture
//! ```

use crate::payload::BodyKind;
use colored::Colorize;
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Placeholder logged when the request carried no payload.
pub const NO_BODY: &str = "No Body Provided";
/// Placeholder logged when no base path was configured.
pub const NO_BASE_PATH: &str = "No BasePath Provided";

const RULE: &str =
    "----------------------------------------------------------------------------------------------------";

/// Request ID counter for correlating wire echoes.
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Maximum body length echoed to stderr before truncation.
const ECHO_BODY_LIMIT: usize = 1000;

/// Check if the stderr wire echo is enabled.
///
/// Cached after the first call, so `REST_HARNESS_WIRE` must be set before the
/// first request goes out.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("REST_HARNESS_WIRE").is_ok())
}

#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Diagnostic summary of one request/response exchange.
#[derive(Debug, Clone)]
pub struct ExchangeReport<'a> {
    /// Label of the code that issued the request.
    pub caller: &'a str,
    pub method: &'a str,
    pub body_kind: BodyKind,
    pub status_code: u16,
    pub base_uri: &'a str,
    pub base_path: Option<&'a str>,
    pub endpoint: &'a str,
    /// Serialized request payload, if any.
    pub request: Option<&'a str>,
    pub response: &'a str,
}

impl fmt::Display for ExchangeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Running Method: {}", self.caller)?;
        writeln!(f, "Operation: {}", self.method)?;
        writeln!(f, "BodyKind: {}", self.body_kind)?;
        writeln!(f, "Status Code: {}", self.status_code)?;
        writeln!(f, "BaseUrl: {}", self.base_uri)?;
        writeln!(f, "BasePath: {}", self.base_path.unwrap_or(NO_BASE_PATH))?;
        writeln!(f, "Final EndPoint To Hit: {}", self.endpoint)?;
        writeln!(f, "#############################-REQUEST-#############################")?;
        writeln!(f, "{}", self.request.unwrap_or(NO_BODY))?;
        writeln!(f, "###########################-REQUEST_END-###########################")?;
        writeln!(f, "#############################-RESPONSE-#############################")?;
        writeln!(f, "{}", self.response)?;
        writeln!(f, "###########################-RESPONSE_END-###########################")?;
        write!(f, "{RULE}")
    }
}

fn prefix(request_id: usize) -> String {
    let ts = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
        .dimmed();
    format!(
        "{} {} {}",
        "[REST_WIRE]".bold(),
        ts,
        format!("[REQ#{request_id}]").cyan()
    )
}

/// Truncates on a character boundary, appending `...` when shortened.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= max_len)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    format!("{}...", &s[..cut])
}

fn echo_body(prefix: &str, label: &str, body: &str) {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body)
        && let Ok(colored) = colored_json::to_colored_json_auto(&parsed)
    {
        eprintln!("{prefix} {label}:");
        for line in colored.lines() {
            eprintln!("{prefix} {line}");
        }
    } else {
        eprintln!("{prefix} {label}: {}", truncate(body, ECHO_BODY_LIMIT));
    }
}

/// Echo a completed exchange to stderr.
pub fn echo_exchange(request_id: usize, report: &ExchangeReport<'_>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    eprintln!(
        "{prefix} {} {} {} ({})",
        ">>>".green().bold(),
        report.method,
        report.endpoint,
        report.caller.dimmed()
    );
    if let Some(request) = report.request {
        echo_body(&prefix, &"Body".green().to_string(), request);
    }

    let status = if report.status_code < 300 {
        report.status_code.to_string().green()
    } else {
        report.status_code.to_string().red()
    };
    eprintln!("{prefix} {} {status}", "<<<".red().bold());
    echo_body(&prefix, &"Response".red().to_string(), report.response);
}

/// Echo a failed dispatch to stderr.
pub fn echo_failure(request_id: usize, method: &str, endpoint: &str, error: &dyn fmt::Display) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    eprintln!(
        "{prefix} {} {method} {endpoint} {}",
        "xxx".red().bold(),
        error.to_string().red()
    );
}
