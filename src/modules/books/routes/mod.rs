//! HTTP handlers for the books catalog.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use bookrec_http::{ApiJson, AppError};

use super::models::{
    Book, CreateBook, Health, RatingUpdate, Recommendation, RecommendQuery, ReplaceBook,
    Replacement, StatusUpdate,
};
use super::service::CatalogService;

type ApiResult<T> = Result<T, AppError>;

/// Routes served by the books module, relative to the configured base path.
pub fn router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/books", get(list).post(create))
        .route("/recommend", get(recommend))
        .route("/books/{id}/status", patch(set_status))
        .route("/books/{id}/replace", put(replace_banned))
        .route("/books/{id}/rating", patch(update_rating))
        .with_state(service)
}

async fn health(State(svc): State<Arc<CatalogService>>) -> ApiResult<Json<Health>> {
    let books_loaded = svc.count().await?;
    Ok(Json(Health {
        ok: true,
        books_loaded,
        pid: std::process::id(),
    }))
}

async fn list(State(svc): State<Arc<CatalogService>>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(svc.get_all().await?))
}

async fn recommend(
    State(svc): State<Arc<CatalogService>>,
    Query(query): Query<RecommendQuery>,
) -> ApiResult<Json<Recommendation>> {
    let title = query
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing required query parameter: title"))?;

    Ok(Json(svc.recommend_by_title(&title).await?))
}

async fn create(
    State(svc): State<Arc<CatalogService>>,
    ApiJson(input): ApiJson<CreateBook>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = svc.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn set_status(
    State(svc): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Book>> {
    let status = body
        .status
        .ok_or_else(|| AppError::invalid_field("status", "need a status"))?;

    Ok(Json(svc.set_status(&id, &status).await?))
}

async fn replace_banned(
    State(svc): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReplaceBook>,
) -> ApiResult<(StatusCode, Json<Replacement>)> {
    let out = svc.replace_banned(&id, input).await?;
    Ok((StatusCode::CREATED, Json(out)))
}

async fn update_rating(
    State(svc): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RatingUpdate>,
) -> ApiResult<Json<Book>> {
    let rating = body
        .rating
        .ok_or_else(|| AppError::invalid_field("rating", "need a rating"))?;

    Ok(Json(svc.update_rating(&id, rating).await?))
}
