//! Fault boundary.
//!
//! Catches panics raised anywhere inside the rest of the chain and turns
//! them into a 500 so the connection gets an answer and the process lives on.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;

use super::{BoxResponseFuture, Interceptor, Next};

#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery;

impl Recovery {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for Recovery {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn intercept<'a>(&'a self, request: Request<Body>, next: Next<'a>) -> BoxResponseFuture<'a> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        Box::pin(async move {
            // `run` starts inner interceptors synchronously, so it must be called
            // inside the guarded future.
            let chain = async move { next.run(request).await };
            match AssertUnwindSafe(chain).catch_unwind().await {
                Ok(response) => response,
                Err(payload) => {
                    tracing::error!(
                        method = %method,
                        path = %path,
                        panic = %panic_message(payload.as_ref()),
                        "panic recovered"
                    );
                    internal_error()
                }
            }
        })
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
