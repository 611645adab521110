//! Request interceptor pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → recovery.rs     (fault boundary, outermost)
//!     → os_extractor.rs (User-Agent → ClientOs extension)
//!     → basic_auth.rs   (401 short-circuit)
//!     → access_log.rs   (timing + structured entry)
//!     → Endpoint        (todo handlers)
//! Response flows back out through the same chain.
//! ```
//!
//! # Design Decisions
//! - Interceptors are objects in an explicit ordered list, outermost first
//! - `Next` is a cursor over the rest of the list; not calling it short-circuits
//! - A built `Pipeline` is a `tower::Service`, mounted with `Router::route_service`

pub mod access_log;
pub mod basic_auth;
pub mod os_extractor;
pub mod recovery;

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{body::Body, http::Request, response::Response, routing::MethodRouter};
use tower::{Service, ServiceExt};

pub use access_log::AccessLog;
pub use basic_auth::{BasicAuth, Credentials};
pub use os_extractor::{ClientOs, OsExtractor};
pub use recovery::Recovery;

/// Boxed response future returned by interceptors and endpoints.
pub type BoxResponseFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// One stage of the pipeline. Wraps everything after it.
pub trait Interceptor: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Handle `request`, delegating to `next` to continue the chain.
    fn intercept<'a>(&'a self, request: Request<Body>, next: Next<'a>) -> BoxResponseFuture<'a>;
}

/// Terminal request handler of a pipeline.
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, request: Request<Body>) -> BoxResponseFuture<'static>;
}

impl Endpoint for MethodRouter {
    fn call(&self, request: Request<Body>) -> BoxResponseFuture<'static> {
        let router = self.clone();
        Box::pin(async move {
            match router.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        })
    }
}

/// The remainder of the chain as seen from one interceptor.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Interceptor>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Run the rest of the chain.
    pub fn run(self, request: Request<Body>) -> BoxResponseFuture<'a> {
        match self.chain.split_first() {
            Some((head, rest)) => head.intercept(
                request,
                Next {
                    chain: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.call(request),
        }
    }
}

/// An ordered interceptor chain plus its endpoint.
#[derive(Clone)]
pub struct Pipeline {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    endpoint: Arc<dyn Endpoint>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Interceptor names, outermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Pass a request through the whole chain.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        Next {
            chain: &self.interceptors,
            endpoint: self.endpoint.as_ref(),
        }
        .run(request)
        .await
    }
}

impl Service<Request<Body>> for Pipeline {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move { Ok(pipeline.handle(request).await) })
    }
}

/// Collects interceptors in order, outermost first.
#[derive(Default)]
pub struct PipelineBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl PipelineBuilder {
    /// Append an interceptor inside the ones already added.
    pub fn with<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Terminate the chain with a method router.
    pub fn endpoint(self, endpoint: MethodRouter) -> Pipeline {
        Pipeline {
            interceptors: self.interceptors.into(),
            endpoint: Arc::new(endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use std::sync::Mutex;

    /// Records entry and exit into a shared trace.
    struct Tracer {
        label: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for Tracer {
        fn name(&self) -> &'static str {
            self.label
        }

        fn intercept<'a>(&'a self, request: Request<Body>, next: Next<'a>) -> BoxResponseFuture<'a> {
            Box::pin(async move {
                self.trace.lock().unwrap().push(format!("enter {}", self.label));
                let response = next.run(request).await;
                self.trace.lock().unwrap().push(format!("exit {}", self.label));
                response
            })
        }
    }

    struct Reject;

    impl Interceptor for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }

        fn intercept<'a>(&'a self, _request: Request<Body>, _next: Next<'a>) -> BoxResponseFuture<'a> {
            Box::pin(async { StatusCode::FORBIDDEN.into_response() })
        }
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn runs_in_order_and_unwinds_in_reverse() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let endpoint_trace = trace.clone();
        let pipeline = Pipeline::builder()
            .with(Tracer { label: "outer", trace: trace.clone() })
            .with(Tracer { label: "inner", trace: trace.clone() })
            .endpoint(get(move || {
                let trace = endpoint_trace.clone();
                async move {
                    trace.lock().unwrap().push("endpoint".to_string());
                    "done"
                }
            }));

        assert_eq!(pipeline.names(), vec!["outer", "inner"]);

        let response = pipeline.handle(request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["enter outer", "enter inner", "endpoint", "exit inner", "exit outer"]
        );
    }

    #[tokio::test]
    async fn short_circuit_skips_inner_layers() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .with(Reject)
            .with(Tracer { label: "inner", trace: trace.clone() })
            .endpoint(get(|| async { "unreachable" }));

        let response = pipeline.handle(request()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(trace.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_chain_calls_endpoint() {
        let pipeline = Pipeline::builder().endpoint(get(|| async { "hello" }));
        let response = pipeline.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unsupported_method_is_405_with_allow() {
        let pipeline = Pipeline::builder().endpoint(get(|| async { "hello" }));
        let request = Request::builder()
            .method("PATCH")
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = pipeline.handle(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key("allow"));
    }
}
