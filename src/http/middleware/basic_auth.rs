//! HTTP Basic authentication against a single configured credential pair.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;

use super::{BoxResponseFuture, Interceptor, Next};
use crate::config::AuthConfig;

const CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

/// The one accepted user/password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// Decode an `Authorization` header value of the form `Basic <base64(user:pass)>`.
    pub fn from_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user_id, password) = decoded.split_once(':')?;
        Some(Self::new(user_id, password))
    }

    fn matches(&self, other: &Credentials) -> bool {
        let user_ok = self.user_id.as_bytes().ct_eq(other.user_id.as_bytes());
        let password_ok = self.password.as_bytes().ct_eq(other.password.as_bytes());
        (user_ok & password_ok).into()
    }
}

/// Rejects requests without the configured Basic credentials.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    expected: Option<Credentials>,
}

impl BasicAuth {
    pub fn new(expected: Credentials) -> Self {
        Self {
            expected: Some(expected),
        }
    }

    /// Without both fields configured, every request is rejected.
    pub fn from_config(config: &AuthConfig) -> Self {
        let expected = match (&config.user_id, &config.password) {
            (Some(user_id), Some(password)) => Some(Credentials::new(user_id, password)),
            _ => {
                tracing::warn!("Basic auth credentials not configured; protected routes will reject all requests");
                None
            }
        };
        Self { expected }
    }

    fn authorize(&self, request: &Request<Body>) -> bool {
        let Some(expected) = &self.expected else {
            return false;
        };
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(Credentials::from_header)
            .is_some_and(|given| expected.matches(&given))
    }
}

fn unauthorized() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}

impl Interceptor for BasicAuth {
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    fn intercept<'a>(&'a self, request: Request<Body>, next: Next<'a>) -> BoxResponseFuture<'a> {
        if self.authorize(&request) {
            return next.run(request);
        }

        tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request");
        Box::pin(async { unauthorized() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::middleware::Pipeline;
    use axum::routing::get;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn encode(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    fn counting_pipeline(auth: BasicAuth) -> (Pipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let pipeline = Pipeline::builder().with(auth).endpoint(get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        }));
        (pipeline, calls)
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/todos");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn parses_header() {
        let creds = Credentials::from_header(&encode("alice", "p:ss")).unwrap();
        assert_eq!(creds, Credentials::new("alice", "p:ss"));

        assert!(Credentials::from_header("Bearer abc").is_none());
        assert!(Credentials::from_header("Basic !!!").is_none());
        assert!(Credentials::from_header(&format!("Basic {}", STANDARD.encode("nocolon"))).is_none());
    }

    #[tokio::test]
    async fn accepts_matching_credentials() {
        let (pipeline, calls) = counting_pipeline(BasicAuth::new(Credentials::new("alice", "secret")));

        let response = pipeline.handle(request(Some(&encode("alice", "secret")))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_credentials() {
        let (pipeline, calls) = counting_pipeline(BasicAuth::new(Credentials::new("alice", "secret")));

        for value in [None, Some(encode("alice", "wrong")), Some(encode("bob", "secret"))] {
            let response = pipeline.handle(request(value.as_deref())).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], CHALLENGE);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unconfigured_rejects_everything() {
        let (pipeline, calls) = counting_pipeline(BasicAuth::from_config(&AuthConfig::default()));

        let response = pipeline.handle(request(Some(&encode("", "")))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
