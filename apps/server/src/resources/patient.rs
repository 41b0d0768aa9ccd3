//! `patient` resource
//!
//! A patient wraps an existing person with one or more identifiers. The
//! person link is fixed at creation; only identifiers can be updated. Patients
//! cannot be listed without a search query.

use async_trait::async_trait;
use records_models::{Location, Patient, PatientIdentifier, PatientIdentifierType, Person};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{parse_payload, person::person_display, Capabilities, DelegatingResource, LinkRef};
use crate::{
    db::{Datastore, EntityStore},
    representation::{
        audit_object, nested, nested_list, Level, Property, Representable, Representation,
        RepresentationContext, SimpleObject,
    },
    search::SearchDocument,
    Error, Result,
};

const PATIENT_DEFAULT: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::nested("identifiers", Level::Ref),
    Property::nested("person", Level::Default),
    Property::scalar("voided"),
];

const PATIENT_FULL: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::nested("identifiers", Level::Default),
    Property::nested("person", Level::Full),
    Property::scalar("voided"),
    Property::scalar("voidReason"),
];

const IDENTIFIER_DEFAULT: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::scalar("identifier"),
    Property::nested("identifierType", Level::Ref),
    Property::nested("location", Level::Ref),
    Property::scalar("preferred"),
    Property::scalar("voided"),
];

const IDENTIFIER_FULL: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::scalar("identifier"),
    Property::nested("identifierType", Level::Default),
    Property::nested("location", Level::Default),
    Property::scalar("preferred"),
    Property::scalar("voided"),
];

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct IdentifierInput {
    #[serde(default)]
    uuid: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    identifier: String,
    identifier_type: LinkRef,
    location: LinkRef,
    #[serde(default)]
    preferred: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatientCreate {
    person: LinkRef,
    identifiers: Vec<IdentifierInput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatientUpdate {
    /// Accepted only when it names the current person.
    person: Option<LinkRef>,
    identifiers: Option<Vec<IdentifierInput>>,
}

pub struct PatientResource {
    store: Arc<dyn EntityStore<Patient>>,
    persons: Arc<dyn EntityStore<Person>>,
    locations: Arc<dyn EntityStore<Location>>,
    identifier_types: Arc<dyn EntityStore<PatientIdentifierType>>,
}

impl PatientResource {
    pub fn new(datastore: &Datastore) -> Self {
        Self {
            store: datastore.patients.clone(),
            persons: datastore.persons.clone(),
            locations: datastore.locations.clone(),
            identifier_types: datastore.identifier_types.clone(),
        }
    }

    /// Check identifier inputs against reference data and other patients.
    async fn build_identifiers(
        &self,
        patient: Uuid,
        inputs: Vec<IdentifierInput>,
        existing: &[PatientIdentifier],
    ) -> Result<Vec<PatientIdentifier>> {
        if inputs.is_empty() {
            return Err(Error::Validation(
                "A patient must have at least one identifier".to_string(),
            ));
        }
        if inputs.iter().filter(|input| input.preferred).count() > 1 {
            return Err(Error::Validation(
                "Only one identifier can be preferred".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut identifiers = Vec::with_capacity(inputs.len());
        for input in inputs {
            input.validate()?;
            let identifier = input.identifier.trim().to_string();
            let identifier_type = input.identifier_type.uuid();
            let location = input.location.uuid();

            match self.identifier_types.get(&identifier_type).await? {
                Some(kind) if !kind.retired.voided => {}
                Some(_) => {
                    return Err(Error::Validation(format!(
                        "Identifier type {identifier_type} is retired"
                    )))
                }
                None => {
                    return Err(Error::Validation(format!(
                        "Identifier type {identifier_type} does not exist"
                    )))
                }
            }
            if self.locations.get(&location).await?.is_none() {
                return Err(Error::Validation(format!(
                    "Location {location} does not exist"
                )));
            }
            if !seen.insert((identifier_type, identifier.clone())) {
                return Err(Error::Validation(format!(
                    "Identifier {identifier} is listed twice"
                )));
            }

            let uuid = match input.uuid {
                Some(uuid) if existing.iter().any(|id| id.uuid == uuid) => uuid,
                Some(uuid) => {
                    return Err(Error::Conversion(format!(
                        "Identifier {uuid} does not belong to this patient"
                    )))
                }
                None => Uuid::new_v4(),
            };

            identifiers.push(PatientIdentifier {
                uuid,
                identifier,
                identifier_type,
                location,
                preferred: input.preferred,
            });
        }

        for other in self.store.list(false).await? {
            if other.uuid == patient {
                continue;
            }
            for taken in &other.identifiers {
                if seen.contains(&(taken.identifier_type, taken.identifier.clone())) {
                    return Err(Error::Validation(format!(
                        "Identifier {} is already in use by another patient",
                        taken.identifier
                    )));
                }
            }
        }

        if !identifiers.iter().any(|id| id.preferred) {
            identifiers[0].preferred = true;
        }
        Ok(identifiers)
    }
}

#[async_trait]
impl DelegatingResource for PatientResource {
    type Entity = Patient;
    type View = PatientView;

    fn name(&self) -> &'static str {
        "patient"
    }

    fn store(&self) -> &Arc<dyn EntityStore<Patient>> {
        &self.store
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            get_all: false,
            search: true,
            create: true,
            update: true,
            void: true,
            purge: true,
        }
    }

    async fn view(&self, patient: Patient) -> Result<PatientView> {
        let person = self.persons.get(&patient.person).await?.ok_or_else(|| {
            Error::Internal(format!(
                "patient/{} refers to missing person/{}",
                patient.uuid, patient.person
            ))
        })?;

        let mut identifiers = Vec::with_capacity(patient.identifiers.len());
        for identifier in &patient.identifiers {
            identifiers.push(IdentifierView {
                patient: patient.uuid,
                identifier: identifier.clone(),
                identifier_type: self.identifier_types.get(&identifier.identifier_type).await?,
                location: self.locations.get(&identifier.location).await?,
            });
        }

        Ok(PatientView {
            patient,
            person,
            identifiers,
        })
    }

    fn search_document(&self, view: &PatientView) -> SearchDocument {
        let mut texts: Vec<String> = view
            .patient
            .identifiers
            .iter()
            .map(|id| id.identifier.clone())
            .collect();
        texts.extend(view.person.names.iter().map(|name| name.full_name()));
        SearchDocument::new(&view.display(), texts, view.patient.void_info.voided)
    }

    async fn new_entity(&self, payload: JsonValue) -> Result<Patient> {
        let body: PatientCreate = parse_payload(self.name(), payload)?;
        let person_uuid = body.person.uuid();

        match self.persons.get(&person_uuid).await? {
            Some(person) if !person.void_info.voided => {}
            Some(_) => {
                return Err(Error::Validation(format!(
                    "Person {person_uuid} is voided"
                )))
            }
            None => {
                return Err(Error::Validation(format!(
                    "Person {person_uuid} does not exist"
                )))
            }
        }
        let already_patient = self
            .store
            .list(false)
            .await?
            .iter()
            .any(|patient| patient.person == person_uuid);
        if already_patient {
            return Err(Error::Validation(format!(
                "Person {person_uuid} is already a patient"
            )));
        }

        let mut patient = Patient::new(person_uuid, Vec::new());
        patient.identifiers = self
            .build_identifiers(patient.uuid, body.identifiers, &[])
            .await?;
        Ok(patient)
    }

    async fn apply_update(&self, mut patient: Patient, payload: JsonValue) -> Result<Patient> {
        let body: PatientUpdate = parse_payload(self.name(), payload)?;

        if let Some(person) = body.person {
            if person.uuid() != patient.person {
                return Err(Error::Conversion(
                    "person is immutable and cannot be changed on an existing patient"
                        .to_string(),
                ));
            }
        }
        if let Some(identifiers) = body.identifiers {
            patient.identifiers = self
                .build_identifiers(patient.uuid, identifiers, &patient.identifiers)
                .await?;
        }
        Ok(patient)
    }
}

/// A patient with its person and identifier metadata resolved.
pub struct PatientView {
    patient: Patient,
    person: Person,
    identifiers: Vec<IdentifierView>,
}

impl Representable for PatientView {
    fn resource_name(&self) -> &'static str {
        "patient"
    }

    fn uuid(&self) -> Uuid {
        self.patient.uuid
    }

    fn display(&self) -> String {
        let person = person_display(&self.person);
        match self.patient.preferred_identifier() {
            Some(id) => format!("{} - {person}", id.identifier),
            None => person,
        }
    }

    fn is_voided(&self) -> bool {
        self.patient.void_info.voided
    }

    fn audit_info(&self) -> Option<SimpleObject> {
        Some(audit_object(&self.patient.audit, &self.patient.void_info))
    }

    fn properties(&self, level: Level) -> &'static [Property] {
        match level {
            Level::Full => PATIENT_FULL,
            Level::Default | Level::Ref => PATIENT_DEFAULT,
        }
    }

    fn property(
        &self,
        name: &str,
        repr: &Representation,
        ctx: &RepresentationContext,
    ) -> Result<Option<JsonValue>> {
        let value = match name {
            "identifiers" => nested_list(&self.identifiers, repr, ctx)?,
            "person" => nested(&self.person, repr, ctx)?,
            "voided" => json!(self.patient.void_info.voided),
            "voidReason" => json!(self.patient.void_info.void_reason),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// A patient identifier rendered as a sub-resource of its patient.
pub struct IdentifierView {
    patient: Uuid,
    identifier: PatientIdentifier,
    identifier_type: Option<PatientIdentifierType>,
    location: Option<Location>,
}

impl Representable for IdentifierView {
    fn resource_name(&self) -> &'static str {
        "identifier"
    }

    fn uuid(&self) -> Uuid {
        self.identifier.uuid
    }

    fn display(&self) -> String {
        match &self.identifier_type {
            Some(kind) => format!("{} = {}", kind.name, self.identifier.identifier),
            None => self.identifier.identifier.clone(),
        }
    }

    fn self_path(&self) -> String {
        format!("patient/{}/identifier/{}", self.patient, self.identifier.uuid)
    }

    fn properties(&self, level: Level) -> &'static [Property] {
        match level {
            Level::Full => IDENTIFIER_FULL,
            Level::Default | Level::Ref => IDENTIFIER_DEFAULT,
        }
    }

    fn property(
        &self,
        name: &str,
        repr: &Representation,
        ctx: &RepresentationContext,
    ) -> Result<Option<JsonValue>> {
        let value = match name {
            "identifier" => json!(self.identifier.identifier),
            "identifierType" => match &self.identifier_type {
                Some(kind) => nested(kind, repr, ctx)?,
                None => JsonValue::Null,
            },
            "location" => match &self.location {
                Some(location) => nested(location, repr, ctx)?,
                None => JsonValue::Null,
            },
            "preferred" => json!(self.identifier.preferred),
            // Identifiers are replaced, never voided individually.
            "voided" => json!(false),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}
