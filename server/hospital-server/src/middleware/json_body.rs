//! JSON request bodies that fail with the API error envelope.

use async_trait::async_trait;
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;

use crate::error::ApiError;

/// `Json<T>` whose rejection is an [`ApiError`] instead of axum's plain-text
/// 4xx, so a body missing `scheduled_at` reads as a 400 naming that field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Booking {
        scheduled_at: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/book",
            post(|ApiJson(booking): ApiJson<Booking>| async move { booking.scheduled_at }),
        )
    }

    async fn post_body(body: &'static str, content_type: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri("/book");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = app()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn well_formed_body_reaches_the_handler() {
        let (status, _) = post_body(
            r#"{"scheduled_at":"2025-06-01T10:30:00"}"#,
            Some("application/json"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_field_is_a_validation_error_naming_it() {
        let (status, body) = post_body(r#"{"reason":"checkup"}"#, Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "validation_error");
        assert_eq!(body["field"], "scheduled_at");
    }

    #[tokio::test]
    async fn syntax_and_content_type_failures_use_the_envelope() {
        let (status, body) = post_body("{not json", Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "validation_error");
        assert!(body.get("field").is_none());

        let (status, body) = post_body(r#"{"scheduled_at":"x"}"#, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "validation_error");
    }
}
