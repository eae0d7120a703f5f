use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|passwd|secret|token|credential)[\s:=]+[^\s]+").unwrap()
});

/// Redact credential-shaped substrings before any external command output
/// reaches the terminal. Dump and admin commands echo connection arguments
/// into their diagnostics.
pub fn sanitize_for_display(message: &str) -> String {
    let sanitized = SENSITIVE_PATTERN.replace_all(message, "$1=[REDACTED]");
    sanitized.to_string()
}
