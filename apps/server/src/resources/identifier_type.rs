//! `patientidentifiertype` resource: read-only reference data

use async_trait::async_trait;
use records_models::PatientIdentifierType;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;

use super::{location::METADATA_PROPERTIES, Capabilities, DelegatingResource};
use crate::{
    db::{Datastore, EntityStore},
    representation::{
        audit_object, Level, Property, Representable, Representation, RepresentationContext,
        SimpleObject,
    },
    search::SearchDocument,
    Result,
};

pub struct PatientIdentifierTypeResource {
    store: Arc<dyn EntityStore<PatientIdentifierType>>,
}

impl PatientIdentifierTypeResource {
    pub fn new(datastore: &Datastore) -> Self {
        Self {
            store: datastore.identifier_types.clone(),
        }
    }
}

#[async_trait]
impl DelegatingResource for PatientIdentifierTypeResource {
    type Entity = PatientIdentifierType;
    type View = PatientIdentifierType;

    fn name(&self) -> &'static str {
        "patientidentifiertype"
    }

    fn store(&self) -> &Arc<dyn EntityStore<PatientIdentifierType>> {
        &self.store
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_ONLY
    }

    async fn view(&self, entity: PatientIdentifierType) -> Result<PatientIdentifierType> {
        Ok(entity)
    }

    fn search_document(&self, view: &PatientIdentifierType) -> SearchDocument {
        SearchDocument::new(&view.name, [&view.name], view.retired.voided)
    }
}

impl Representable for PatientIdentifierType {
    fn resource_name(&self) -> &'static str {
        "patientidentifiertype"
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
