//! Client operating system detection from `User-Agent`.

use axum::{
    body::Body,
    http::{header, Request},
};

use woothee::parser::Parser;

use super::{BoxResponseFuture, Interceptor, Next};

/// Label used when the OS cannot be determined.
pub const UNKNOWN_OS: &str = "Unknown";

/// Normalized client OS, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOs(pub String);

impl ClientOs {
    pub fn unknown() -> Self {
        Self(UNKNOWN_OS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Folds woothee's OS names (e.g. `Windows 10`, `Mac OSX`, `iPhone`) into
/// one label per platform. Names not listed pass through unchanged.
fn normalize(os: &str) -> &str {
    match os {
        "" | "UNKNOWN" => UNKNOWN_OS,
        "Mac OSX" => "macOS",
        "iPhone" | "iPad" | "iPod" | "iOS" => "iOS",
        os if os.starts_with("Windows Phone") => "Windows Phone",
        os if os.starts_with("Windows") => "Windows",
        os if os.starts_with("BlackBerry") => "BlackBerry",
        os => os,
    }
}

/// Map a raw `User-Agent` value to a normalized OS label.
pub fn parse_os(user_agent: &str) -> ClientOs {
    Parser::new()
        .parse(user_agent)
        .map(|result| ClientOs(normalize(result.os).to_string()))
        .unwrap_or_else(ClientOs::unknown)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsExtractor;

impl Interceptor for OsExtractor {
    fn name(&self) -> &'static str {
        "os_extractor"
    }

    fn intercept<'a>(&'a self, mut request: Request<Body>, next: Next<'a>) -> BoxResponseFuture<'a> {
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let os = parse_os(user_agent);

        tracing::debug!(os = %os, user_agent = %user_agent, "Parsed client OS");

        request.extensions_mut().insert(os);
        next.run(request)
    }
}
