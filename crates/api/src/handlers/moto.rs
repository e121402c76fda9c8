//! Handlers for the `/motos` resource.
//!
//! Writes follow one path: deserialize the operation's DTO, validate it
//! against the operation's group, then hand the entity to the timestamp
//! processor, which stamps audit fields and delegates to storage.
//!
//! PUT and PATCH lock the stored row (`SELECT ... FOR UPDATE`) and write it
//! back inside the same transaction, so overlapping updates to one moto are
//! applied one after the other instead of overwriting each other.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use motos_core::error::CoreError;
use motos_core::types::DbId;
use motos_db::models::moto::{CreateMoto, Moto, PatchMoto, UpdateMoto};
use motos_db::processor::PersistProcessor;
use motos_db::repositories::MotoRepo;
use sqlx::PgConnection;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::query::PaginationParams;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Moto", id })
}

/// Load a moto or fail with 404.
async fn ensure_moto_exists(state: &AppState, id: DbId) -> AppResult<Moto> {
    MotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Load a moto and lock its row for the rest of the transaction, or fail
/// with 404.
async fn lock_moto(conn: &mut PgConnection, id: DbId) -> AppResult<Moto> {
    MotoRepo::find_by_id_for_update(conn, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Persist an already-validated moto through the processor chain.
///
/// A `RowNotFound` from the delegate means the row is gone; report it as a
/// 404 for that id.
async fn persist(state: &AppState, conn: &mut PgConnection, moto: Moto) -> AppResult<Moto> {
    let id = moto.id;
    match state.motos.persist(conn, moto).await {
        Ok(saved) => Ok(saved),
        Err(sqlx::Error::RowNotFound) => match id {
            Some(id) => Err(not_found(id)),
            None => Err(AppError::Database(sqlx::Error::RowNotFound)),
        },
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/motos
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Vec<Moto>>> {
    let (limit, offset) = params.resolve();
    let motos = MotoRepo::list(&state.pool, limit, offset).await?;
    tracing::debug!(count = motos.len(), limit, offset, "Listed motos");
    Ok(Json(motos))
}

/// POST /api/v1/motos
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateMoto>,
) -> AppResult<(StatusCode, Json<Moto>)> {
    let moto = input.into_new_moto()?;
    let mut conn = state.pool.acquire().await?;
    let created = persist(&state, &mut conn, moto).await?;
    tracing::info!(id = ?created.id, modelo = %created.modelo, "Moto created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/motos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Moto>> {
    let moto = ensure_moto_exists(&state, id).await?;
    Ok(Json(moto))
}

/// PUT /api/v1/motos/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateMoto>,
) -> AppResult<Json<Moto>> {
    let mut tx = state.pool.begin().await?;
    let mut moto = lock_moto(&mut tx, id).await?;
    input.apply_to(&mut moto)?;

    let updated = persist(&state, &mut tx, moto).await?;
    tx.commit().await?;
    tracing::info!(id, "Moto replaced");
    Ok(Json(updated))
}

/// PATCH /api/v1/motos/{id}
pub async fn patch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<PatchMoto>,
) -> AppResult<Json<Moto>> {
    let mut tx = state.pool.begin().await?;
    let mut moto = lock_moto(&mut tx, id).await?;
    input.merge_onto(&moto).apply_to(&mut moto)?;

    let updated = persist(&state, &mut tx, moto).await?;
    tx.commit().await?;
    tracing::info!(id, "Moto patched");
    Ok(Json(updated))
}

/// DELETE /api/v1/motos/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<StatusCode> {
    if MotoRepo::delete(&state.pool, id).await? {
        tracing::info!(id, "Moto deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
