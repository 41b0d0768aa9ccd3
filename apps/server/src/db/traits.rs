//! Persistence collaborator consumed by the resource layer

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use records_models::Voidable;
use uuid::Uuid;

use crate::Result;

/// Storage primitives for one entity type.
///
/// Implementations serialize conflicting writes to the same entity; the
/// resource layer adds no locking of its own.
#[async_trait]
pub trait EntityStore<E>: Send + Sync
where
    E: Voidable + Clone + Send + Sync + 'static,
{
    /// Resource name used in errors, e.g. `patient`.
    fn resource(&self) -> &'static str;

    async fn get(&self, uuid: &Uuid) -> Result<Option<E>>;

    /// All entities in insertion order.
    async fn list(&self, include_voided: bool) -> Result<Vec<E>>;

    /// Persist a new entity. Fails if the UUID is taken.
    async fn insert(&self, entity: E) -> Result<E>;

    /// Replace an existing entity. Fails with NotFound if absent.
    async fn update(&self, entity: E) -> Result<E>;

    /// Mark the entity voided and return the stored result.
    async fn void(&self, uuid: &Uuid, reason: &str, user: &str, at: DateTime<Utc>) -> Result<E>;

    /// Remove the entity permanently. Returns false when nothing was stored.
    async fn purge(&self, uuid: &Uuid) -> Result<bool>;

    async fn count(&self, include_voided: bool) -> Result<usize>;
}
