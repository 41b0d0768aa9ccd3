//! In-process `EntityStore` implementation.
//!
//! Rows live in insertion order behind a tokio `RwLock`; writers hold the
//! lock for the whole read-modify-write, which serializes conflicting writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use records_models::Voidable;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::EntityStore;
use crate::{Error, Result};

struct Table<E> {
    next_seq: u64,
    rows: BTreeMap<u64, E>,
    by_uuid: HashMap<Uuid, u64>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            rows: BTreeMap::new(),
            by_uuid: HashMap::new(),
        }
    }
}

impl<E: Voidable> Table<E> {
    fn get_mut(&mut self, uuid: &Uuid) -> Option<&mut E> {
        let seq = self.by_uuid.get(uuid)?;
        self.rows.get_mut(seq)
    }
}

pub struct MemoryStore<E> {
    resource: &'static str,
    table: RwLock<Table<E>>,
}

impl<E> MemoryStore<E> {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            table: RwLock::new(Table::default()),
        }
    }
}

#[async_trait]
impl<E> EntityStore<E> for MemoryStore<E>
where
    E: Voidable + Clone + Send + Sync + 'static,
{
    fn resource(&self) -> &'static str {
        self.resource
    }

    async fn get(&self, uuid: &Uuid) -> Result<Option<E>> {
        let table = self.table.read().await;
        Ok(table
            .by_uuid
            .get(uuid)
            .and_then(|seq| table.rows.get(seq))
            .cloned())
    }

    async fn list(&self, include_voided: bool) -> Result<Vec<E>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|entity| include_voided || !entity.is_voided())
            .cloned()
            .collect())
    }

    async fn insert(&self, entity: E) -> Result<E> {
        let mut table = self.table.write().await;
        let uuid = entity.uuid();
        if table.by_uuid.contains_key(&uuid) {
            return Err(Error::Validation(format!(
                "{} with uuid {} already exists",
                self.resource, uuid
            )));
        }

        let seq = table.next_seq;
        table.next_seq += 1;
        table.by_uuid.insert(uuid, seq);
        table.rows.insert(seq, entity.clone());

        tracing::debug!(resource = self.resource, %uuid, "Inserted entity");
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E> {
        let mut table = self.table.write().await;
        let uuid = entity.uuid();
        let slot = table
            .get_mut(&uuid)
            .ok_or_else(|| Error::not_found(self.resource, uuid))?;
        *slot = entity.clone();

        tracing::debug!(resource = self.resource, %uuid, "Updated entity");
        Ok(entity)
    }

    async fn void(&self, uuid: &Uuid, reason: &str, user: &str, at: DateTime<Utc>) -> Result<E> {
        let mut table = self.table.write().await;
        let entity = table
            .get_mut(uuid)
            .ok_or_else(|| Error::not_found(self.resource, uuid))?;
        entity.void(reason, user, at);

        tracing::debug!(resource = self.resource, %uuid, "Voided entity");
        Ok(entity.clone())
    }

    async fn purge(&self, uuid: &Uuid) -> Result<bool> {
        let mut table = self.table.write().await;
        let Some(seq) = table.by_uuid.remove(uuid) else {
            return Ok(false);
        };
        table.rows.remove(&seq);

        tracing::debug!(resource = self.resource, %uuid, "Purged entity");
        Ok(true)
    }

    async fn count(&self, include_voided: bool) -> Result<usize> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|entity| include_voided || !entity.is_voided())
            .count())
    }
}
