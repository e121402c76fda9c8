//! Route definitions for the `/motos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::moto;
use crate::state::AppState;

/// Routes mounted at `/motos`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// PATCH  /{id}      -> patch
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(moto::list).post(moto::create))
        .route(
            "/{id}",
            get(moto::get_by_id)
                .put(moto::update)
                .patch(moto::patch)
                .delete(moto::delete),
        )
}
