//! Request body and query string extraction

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// Largest request body accepted by the JSON routes (1 MiB)
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// `axum::Json` with rejections rendered through [`AppError`]
///
/// Malformed JSON, wrong field types, unknown fields (for types marked
/// `deny_unknown_fields`), empty or trailing input all come back as a
/// `400 BAD_REQUEST` envelope instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Query` with rejections rendered through [`AppError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Paging {
        #[allow(dead_code)]
        page: i64,
    }

    async fn paging(QueryParams(_): QueryParams<Paging>) -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn test_query_rejection_uses_error_envelope() {
        let app = Router::new().route("/", get(paging));
        let response = app
            .oneshot(Request::builder().uri("/?page=x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
