use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use shape::{PostTags, is_alphanumeric_with_hyphen, parse_id_list};
use svckit::{ApiResult, Authz, Problem, ValidationViolation, parse_path_id};

use super::dto::{
    AssignTagsRequest, ListTagsQuery, PostTagsQuery, RemoveTagsRequest, TagDto, TagNameRequest,
    TagWithPostsDto,
};
use crate::domain::model::TagFilter;
use crate::domain::service::Service;

#[tracing::instrument(skip(_caller, svc, payload))]
pub async fn create_tag(
    Authz(_caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<TagNameRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TagDto>)> {
    let Json(req) = payload?;
    let tag = svc.create_tag(&req.name).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

#[tracing::instrument(skip(_caller, svc, query))]
pub async fn list_tags(
    Authz(_caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<ListTagsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TagDto>>> {
    let Query(query) = query?;
    let filter = parse_filter(query)?;
    let tags = svc.list_tags(&filter).await?;
    Ok(Json(tags.into_iter().map(TagDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller))]
pub async fn get_tag(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TagWithPostsDto>> {
    let id = parse_path_id(&id)?;
    let tag = svc.get_tag(&caller, id).await?;
    Ok(Json(tag.into()))
}

#[tracing::instrument(skip(_caller, svc, payload))]
pub async fn rename_tag(
    Authz(_caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    payload: Result<Json<TagNameRequest>, JsonRejection>,
) -> ApiResult<Json<TagDto>> {
    let id = parse_path_id(&id)?;
    let Json(req) = payload?;
    let tag = svc.rename_tag(id, &req.name).await?;
    Ok(Json(tag.into()))
}

#[tracing::instrument(skip(_caller, svc))]
pub async fn delete_tag(
    Authz(_caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TagDto>> {
    let id = parse_path_id(&id)?;
    let tag = svc.delete_tag(id).await?;
    Ok(Json(tag.into()))
}

#[tracing::instrument(skip(svc, caller, payload))]
pub async fn assign_tags(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<AssignTagsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostTags>)> {
    let Json(req) = payload?;
    let tags = svc.assign_tags(&caller, req.post_id, &req.tags).await?;
    Ok((StatusCode::CREATED, Json(tags)))
}

#[tracing::instrument(skip(_caller, svc, query))]
pub async fn post_tags(
    Authz(_caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<PostTagsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PostTags>>> {
    let Query(query) = query?;
    let raw = query
        .post_id
        .ok_or_else(|| Problem::invalid_field("postId", "postId is required"))?;
    let ids = parse_id_list(&raw)
        .map_err(|_| Problem::invalid_field("postId", "Array does not contain Integers"))?;

    Ok(Json(svc.post_tags(&ids).await?))
}

#[tracing::instrument(skip(svc, caller, payload))]
pub async fn remove_tags(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<RemoveTagsRequest>, JsonRejection>,
) -> ApiResult<Json<PostTags>> {
    let Json(req) = payload?;
    let tags = svc.remove_tags(&caller, req.post_id, &req.tags).await?;
    Ok(Json(tags))
}

fn parse_filter(query: ListTagsQuery) -> Result<TagFilter, Problem> {
    let mut violations = Vec::new();

    let search = query.query.filter(|q| !q.is_empty());
    if search.as_deref().is_some_and(|q| !is_alphanumeric_with_hyphen(q)) {
        violations.push(ValidationViolation::new("query", "valid query required"));
    }

    let ids = match query.id.as_deref().map(parse_id_list) {
        None => None,
        Some(Ok(ids)) => Some(ids),
        Some(Err(_)) => {
            violations.push(ValidationViolation::new(
                "id",
                "Array does not contain Integers",
            ));
            None
        }
    };

    if !violations.is_empty() {
        return Err(Problem::validation(violations));
    }
    Ok(TagFilter { search, ids })
}
