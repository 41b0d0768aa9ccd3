//! Resource layer
//!
//! Each REST resource implements [`DelegatingResource`]: it names its store,
//! declares what it supports, turns payloads into entities and entities into
//! renderable views. [`ResourceController`] wraps one of these into the
//! object-safe [`RestResource`] used by the HTTP layer and runs the shared
//! lifecycle (audit stamping, void policy, indexing, hooks).

pub mod controller;
pub mod identifier_type;
pub mod location;
pub mod patient;
pub mod person;
pub mod registry;

pub use controller::{ListQuery, RequestContext, ResourceController, RestResource};
pub use registry::ResourceRegistry;

use async_trait::async_trait;
use records_models::Voidable;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::EntityStore, representation::Representable, search::SearchDocument, Error, Result,
};

/// Operations a resource allows beyond fetch-by-uuid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub get_all: bool,
    pub search: bool,
    pub create: bool,
    pub update: bool,
    pub void: bool,
    pub purge: bool,
}

impl Capabilities {
    /// Reference data: readable and searchable, never written over REST.
    pub const READ_ONLY: Capabilities = Capabilities {
        get_all: true,
        search: true,
        create: false,
        update: false,
        void: false,
        purge: false,
    };
}

#[async_trait]
pub trait DelegatingResource: Send + Sync + 'static {
    type Entity: Voidable + Clone + Send + Sync + 'static;
    type View: Representable + Send + Sync;

    /// Path segment, e.g. `patient`.
    fn name(&self) -> &'static str;

    fn store(&self) -> &Arc<dyn EntityStore<Self::Entity>>;

    fn capabilities(&self) -> Capabilities;

    /// Resolve linked entities needed for rendering and indexing.
    async fn view(&self, entity: Self::Entity) -> Result<Self::View>;

    fn search_document(&self, view: &Self::View) -> SearchDocument;

    /// Build a new, unsaved entity from a create payload.
    async fn new_entity(&self, _payload: JsonValue) -> Result<Self::Entity> {
        Err(Error::unsupported(self.name(), "create"))
    }

    /// Apply an update payload. Must not touch the store.
    async fn apply_update(
        &self,
        _entity: Self::Entity,
        _payload: JsonValue,
    ) -> Result<Self::Entity> {
        Err(Error::unsupported(self.name(), "update"))
    }

    /// Last chance to refuse a purge.
    async fn before_purge(&self, _entity: &Self::Entity) -> Result<()> {
        Ok(())
    }
}

/// A linked entity in a payload: either a bare UUID or an object with one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LinkRef {
    Uuid(Uuid),
    Object { uuid: Uuid },
}

impl LinkRef {
    pub fn uuid(&self) -> Uuid {
        match self {
            LinkRef::Uuid(uuid) | LinkRef::Object { uuid } => *uuid,
        }
    }
}

/// Deserialize a payload, reporting shape errors as conversion failures.
pub fn parse_payload<T: DeserializeOwned>(resource: &str, payload: JsonValue) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| Error::Conversion(format!("Cannot convert payload for {resource}: {e}")))
}
