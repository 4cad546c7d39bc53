use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use shape::{is_alphanumeric_with_hyphen, parse_id_list};
use svckit::{ApiResult, Authz, Problem, ValidationViolation, parse_path_id};

use super::dto::{
    CreatePostRequest, ListPostsQuery, PostDto, PostRecordDto, PostThreadDto, UpdatePostRequest,
};
use crate::domain::model::PostFilter;
use crate::domain::service::Service;

#[tracing::instrument(skip(svc, caller, payload))]
pub async fn create_post(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostRecordDto>)> {
    let Json(req) = payload?;
    let post = svc.create_post(&caller, req.content, req.parent_id).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[tracing::instrument(skip(svc, caller, query))]
pub async fn list_posts(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PostDto>>> {
    let Query(query) = query?;
    let filter = parse_filter(query)?;
    let posts = svc.list_posts(&caller, &filter).await?;
    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller))]
pub async fn get_post(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostThreadDto>> {
    let id = parse_path_id(&id)?;
    let thread = svc.get_post(&caller, id).await?;
    Ok(Json(thread.into()))
}

#[tracing::instrument(skip(svc, caller, payload))]
pub async fn update_post(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> ApiResult<Json<PostRecordDto>> {
    let id = parse_path_id(&id)?;
    let Json(req) = payload?;
    let post = svc.update_post(&caller, id, req.content).await?;
    Ok(Json(post.into()))
}

#[tracing::instrument(skip(svc, caller))]
pub async fn delete_post(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostRecordDto>> {
    let id = parse_path_id(&id)?;
    let post = svc.delete_post(&caller, id).await?;
    Ok(Json(post.into()))
}

/// Checks every query field and reports all bad ones together.
fn parse_filter(query: ListPostsQuery) -> Result<PostFilter, Problem> {
    let mut violations = Vec::new();

    let search = query.query.filter(|q| !q.is_empty());
    if search.as_deref().is_some_and(|q| !is_alphanumeric_with_hyphen(q)) {
        violations.push(ValidationViolation::new("query", "valid query required"));
    }

    let ids = match query.id.as_deref() {
        None => None,
        Some(raw) => match parse_id_list(raw) {
            Ok(ids) => Some(ids),
            Err(_) => {
                violations.push(ValidationViolation::new(
                    "id",
                    "Array does not contain Integers",
                ));
                None
            }
        },
    };

    let user_id = match query.user_id.as_deref() {
        None => None,
        Some(raw) => match raw.trim().parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => {
                violations.push(ValidationViolation::new("userId", "valid userId required"));
                None
            }
        },
    };

    if !violations.is_empty() {
        return Err(Problem::validation(violations));
    }
    Ok(PostFilter {
        search,
        ids,
        user_id,
    })
}
