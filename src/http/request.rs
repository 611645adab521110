//! Request body extraction.
//!
//! # Design Decisions
//! - Content-Type is not required; the body is always parsed as JSON
//! - Every decode failure, including unknown fields, is a 400

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::http::response::ApiError;

/// JSON body extractor whose rejection is an [`ApiError::BadRequest`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        name: String,
    }

    fn request(body: &'static str) -> Request {
        Request::builder().uri("/").body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn decodes_without_content_type() {
        let JsonBody(payload) = JsonBody::<Payload>::from_request(request(r#"{"name":"x"}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.name, "x");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        for body in ["{", "", r#"{"name":"x","other":1}"#, r#"{"name":3}"#] {
            let err = JsonBody::<Payload>::from_request(request(body), &()).await.unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "body: {body}");
        }
    }
}
