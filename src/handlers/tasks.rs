//! Task handlers: list, create, read, update, delete.

use crate::entities::{task, to_row, IdParam};
use crate::error::AppError;
use crate::extractors::{Services, ValidJson, ValidPatch, ValidPath, ValidQuery};
use crate::response::{created, no_content, ok};
use crate::service::Pagination;
use crate::sql::Filter;
use axum::response::IntoResponse;

pub async fn list(
    services: Services,
    ValidQuery(pagination): ValidQuery<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let page = services
        .service(task::TABLE)?
        .find(pagination, &Filter::all(), &[])
        .await?;
    Ok(ok(page))
}

pub async fn create(
    services: Services,
    ValidJson(body): ValidJson<task::NewTask>,
) -> Result<impl IntoResponse, AppError> {
    let inserted = services
        .service(task::TABLE)?
        .create(to_row(&body)?)
        .await?
        .ok_or(AppError::Conflict(None))?;
    Ok(created(inserted))
}

pub async fn get_one(
    services: Services,
    ValidPath(IdParam { id }): ValidPath<IdParam>,
) -> Result<impl IntoResponse, AppError> {
    let row = services
        .service(task::TABLE)?
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound(None))?;
    Ok(ok(row))
}

pub async fn patch(
    services: Services,
    ValidPath(IdParam { id }): ValidPath<IdParam>,
    ValidPatch(body): ValidPatch<task::TaskPatch>,
) -> Result<impl IntoResponse, AppError> {
    let row = services
        .service(task::TABLE)?
        .update_by_id(&id, to_row(&body)?)
        .await?
        .ok_or(AppError::NotFound(None))?;
    Ok(ok(row))
}

pub async fn remove(
    services: Services,
    ValidPath(IdParam { id }): ValidPath<IdParam>,
) -> Result<impl IntoResponse, AppError> {
    services
        .service(task::TABLE)?
        .delete_by_id(&id)
        .await?
        .ok_or(AppError::NotFound(None))?;
    Ok(no_content())
}
