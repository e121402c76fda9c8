pub mod health;
pub mod moto;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /motos                 list, create
/// /motos/{id}            get, replace, patch, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/motos", moto::router())
}
