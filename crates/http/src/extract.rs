//! Request extractors that report failures in the standard error envelope.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejections are 400 validation errors
/// instead of axum's plain-text 415/422 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let reason = rejection.body_text();
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "expected a JSON request body".to_string(),
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON".to_string(),
        _ => reason.clone(),
    };
    AppError::validation(vec![serde_json::json!({ "error": reason })], message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Payload {
        year: i64,
    }

    async fn echo(ApiJson(payload): ApiJson<Payload>) -> String {
        payload.year.to_string()
    }

    fn app() -> Router {
        Router::new().route("/", post(echo))
    }

    fn request(content_type: Option<&str>, body: &str) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn accepts_well_typed_body() {
        let response = app()
            .oneshot(request(Some("application/json"), r#"{"year": 1965}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_field_type_is_bad_request() {
        let response = app()
            .oneshot(request(Some("application/json"), r#"{"year": "nineteen"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let response = app()
            .oneshot(request(Some("application/json"), "{"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let response = app().oneshot(request(None, "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
