//! Write processors.
//!
//! Every write goes through a [`PersistProcessor`] chain:
//!
//! ```text
//! handler -> TimestampProcessor -> MotoPersister -> MotoRepo (INSERT / UPDATE)
//! ```
//!
//! Processors write through a session handed in by the caller, normally a
//! [`PgConnection`] borrowed from a transaction. That lets a handler lock the
//! row, merge the request onto it and write it back as one unit of work.
//!
//! [`TimestampProcessor`] is generic over the entity, the session and the
//! inner processor, so any [`Auditable`] entity gets the same creation/update
//! stamping by wrapping its own persister.

use async_trait::async_trait;
use motos_core::audit::{stamp_timestamps, Auditable, Clock, SystemClock};
use sqlx::PgConnection;

use crate::models::moto::Moto;
use crate::repositories::MotoRepo;

/// Persist an entity through `session` and return the stored version (with
/// any identifier the storage layer assigned).
#[async_trait]
pub trait PersistProcessor<E, S = PgConnection>: Send + Sync
where
    E: Send + 'static,
    S: Send + 'static,
{
    async fn persist(&self, session: &mut S, entity: E) -> Result<E, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// Timestamp stamping
// ---------------------------------------------------------------------------

/// Stamps audit timestamps, then delegates to the wrapped processor.
///
/// Performs no I/O of its own and returns the delegate's result unchanged,
/// errors included.
#[derive(Debug, Clone)]
pub struct TimestampProcessor<P, C = SystemClock> {
    inner: P,
    clock: C,
}

impl<P> TimestampProcessor<P> {
    pub fn new(inner: P) -> Self {
        Self::with_clock(inner, SystemClock)
    }
}

impl<P, C> TimestampProcessor<P, C> {
    pub fn with_clock(inner: P, clock: C) -> Self {
        Self { inner, clock }
    }
}

#[async_trait]
impl<E, S, P, C> PersistProcessor<E, S> for TimestampProcessor<P, C>
where
    E: Auditable + Send + 'static,
    S: Send + 'static,
    P: PersistProcessor<E, S>,
    C: Clock,
{
    async fn persist(&self, session: &mut S, mut entity: E) -> Result<E, sqlx::Error> {
        let now = self.clock.now();
        tracing::debug!(new = entity.is_new(), %now, "Stamping audit timestamps");
        stamp_timestamps(&mut entity, now);
        self.inner.persist(session, entity).await
    }
}

// ---------------------------------------------------------------------------
// Moto persistence delegate
// ---------------------------------------------------------------------------

/// Writes a [`Moto`] to the `motos` table: INSERT when it has no id yet,
/// single-row UPDATE otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotoPersister;

#[async_trait]
impl PersistProcessor<Moto> for MotoPersister {
    async fn persist(&self, conn: &mut PgConnection, moto: Moto) -> Result<Moto, sqlx::Error> {
        match moto.id {
            None => MotoRepo::insert(conn, &moto).await,
            Some(id) => MotoRepo::update(conn, id, &moto)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }
}

/// The processor chain used for every Moto write.
pub type MotoProcessor = TimestampProcessor<MotoPersister>;

impl Default for MotoProcessor {
    fn default() -> Self {
        TimestampProcessor::new(MotoPersister)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
