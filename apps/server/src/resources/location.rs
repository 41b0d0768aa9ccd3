//! `location` resource: read-only reference data

use async_trait::async_trait;
use records_models::Location;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;

use super::{Capabilities, DelegatingResource};
use crate::{
    db::{Datastore, EntityStore},
    representation::{
        audit_object, Level, Property, Representable, Representation, RepresentationContext,
        SimpleObject,
    },
    search::SearchDocument,
    Result,
};

pub(crate) const METADATA_PROPERTIES: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::scalar("name"),
    Property::scalar("description"),
];

pub struct LocationResource {
    store: Arc<dyn EntityStore<Location>>,
}

impl LocationResource {
    pub fn new(datastore: &Datastore) -> Self {
        Self {
            store: datastore.locations.clone(),
        }
    }
}

#[async_trait]
impl DelegatingResource for LocationResource {
    type Entity = Location;
    type View = Location;

    fn name(&self) -> &'static str {
        "location"
    }

    fn store(&self) -> &Arc<dyn EntityStore<Location>> {
        &self.store
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_ONLY
    }

    async fn view(&self, entity: Location) -> Result<Location> {
        Ok(entity)
    }

    fn search_document(&self, view: &Location) -> SearchDocument {
        SearchDocument::new(&view.name, [&view.name], view.retired.voided)
    }
}

impl Representable for Location {
    fn resource_name(&self) -> &'static str {
        "location"
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn display(&self) -> String {
        self.name.clone()
    }

    fn is_voided(&self) -> bool {
        self.retired.voided
    }

    fn audit_info(&self) -> Option<SimpleObject> {
        Some(audit_object(&self.audit, &self.retired))
    }

    fn properties(&self, _level: Level) -> &'static [Property] {
        METADATA_PROPERTIES
    }

    fn property(
        &self,
        name: &str,
        _repr: &Representation,
        _ctx: &RepresentationContext,
    ) -> Result<Option<JsonValue>> {
        Ok(match name {
            "name" => Some(json!(self.name)),
            "description" => Some(json!(self.description)),
            "retired" => Some(json!(self.retired.voided)),
            _ => None,
        })
    }
}
