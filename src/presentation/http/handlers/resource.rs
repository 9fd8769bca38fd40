//! Resource Handlers
//!
//! One set of generic handlers serves every entity; the router
//! instantiates them per resource type.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::application::dto::PageQuery;
use crate::domain::Resource;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// `GET /api/{resource}?page=&limit=&<filters>`
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    paging: Result<Query<PageQuery>, QueryRejection>,
    filter: Result<Query<R::ListFilter>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(paging) = paging?;
    let Query(filter) = filter?;

    let page = state
        .crud::<R>()
        .get_all(filter, paging.page, paging.limit)
        .await?;

    Ok(Json(page.into_json(R::PLURAL)?))
}

/// `POST /api/{resource}`
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    body: Result<Json<R::NewInput>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let Json(input) = body?;
    let record = state.crud::<R>().add(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/{resource}/{id}`
pub async fn show<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError> {
    Ok(Json(state.crud::<R>().get_by_id(&id).await?))
}

/// `PATCH /api/{resource}/{id}`
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, AppError> {
    let Json(patch) = body?;
    Ok(Json(state.crud::<R>().update(&id, patch).await?))
}

/// `DELETE /api/{resource}/{id}`; responds with the removed record
pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError> {
    Ok(Json(state.crud::<R>().delete(&id).await?))
}
