//! Repository for the `motos` table.

use motos_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::moto::Moto;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, modelo, cilindrada, marca, tipo, extras, peso, \
                       created_at, updated_at, edicion_limitada";

/// Provides CRUD operations for motos.
///
/// Writes go through [`crate::processor::MotoPersister`] so that audit
/// timestamps are always stamped first; call [`MotoRepo::insert`] and
/// [`MotoRepo::update`] directly only from a persistence processor.
///
/// Writes and the locking read take a connection rather than the pool so
/// they can share the caller's transaction.
pub struct MotoRepo;

impl MotoRepo {
    /// Insert a new moto, returning the stored row with its generated `id`.
    pub async fn insert(conn: &mut PgConnection, moto: &Moto) -> Result<Moto, sqlx::Error> {
        let query = format!(
            "INSERT INTO motos
                (modelo, cilindrada, marca, tipo, extras, peso,
                 created_at, updated_at, edicion_limitada)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Moto>(&query)
            .bind(&moto.modelo)
            .bind(moto.cilindrada)
            .bind(&moto.marca)
            .bind(moto.tipo.as_str())
            .bind(Json(&moto.extras))
            .bind(moto.peso)
            .bind(moto.created_at)
            .bind(moto.updated_at)
            .bind(moto.edicion_limitada)
            .fetch_one(conn)
            .await
    }

    /// Overwrite the writable columns of an existing moto in a single-row
    /// statement.
    ///
    /// `created_at` and `edicion_limitada` are never written here. Returns
    /// `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        moto: &Moto,
    ) -> Result<Option<Moto>, sqlx::Error> {
        let query = format!(
            "UPDATE motos SET
                modelo = $2,
                cilindrada = $3,
                marca = $4,
                tipo = $5,
                extras = $6,
                peso = $7,
                updated_at = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Moto>(&query)
            .bind(id)
            .bind(&moto.modelo)
            .bind(moto.cilindrada)
            .bind(&moto.marca)
            .bind(moto.tipo.as_str())
            .bind(Json(&moto.extras))
            .bind(moto.peso)
            .bind(moto.updated_at)
            .fetch_optional(conn)
            .await
    }

    /// Find a moto by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Moto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM motos WHERE id = $1");
        sqlx::query_as::<_, Moto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a moto by its ID and hold a row lock on it until the enclosing
    /// transaction ends. Concurrent writers to the same row queue up here.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Moto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM motos WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Moto>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List motos ordered by ID, one page at a time.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Moto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM motos ORDER BY id ASC LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Moto>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Permanently delete a moto by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM motos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
