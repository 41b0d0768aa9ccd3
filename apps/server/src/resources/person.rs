//! `person` resource

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use records_models::{Gender, Patient, Person, PersonName};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{parse_payload, Capabilities, DelegatingResource};
use crate::{
    db::{Datastore, EntityStore},
    representation::{
        audit_object, nested, nested_list, Level, Property, Representable, Representation,
        RepresentationContext, SimpleObject,
    },
    search::SearchDocument,
    Error, Result,
};

const PERSON_DEFAULT: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::scalar("gender"),
    Property::scalar("age"),
    Property::scalar("birthdate"),
    Property::scalar("birthdateEstimated"),
    Property::scalar("dead"),
    Property::nested("preferredName", Level::Ref),
    Property::scalar("voided"),
];

const PERSON_FULL: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::scalar("gender"),
    Property::scalar("age"),
    Property::scalar("birthdate"),
    Property::scalar("birthdateEstimated"),
    Property::scalar("dead"),
    Property::nested("preferredName", Level::Ref),
    Property::scalar("voided"),
    Property::nested("names", Level::Default),
    Property::scalar("voidReason"),
];

const NAME_PROPERTIES: &[Property] = &[
    Property::scalar("uuid"),
    Property::scalar("display"),
    Property::scalar("givenName"),
    Property::scalar("middleName"),
    Property::scalar("familyName"),
    Property::scalar("preferred"),
];

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct NameInput {
    #[serde(default)]
    uuid: Option<Uuid>,
    #[validate(length(max = 50))]
    given_name: Option<String>,
    #[validate(length(max = 50))]
    middle_name: Option<String>,
    #[validate(length(max = 50))]
    family_name: Option<String>,
    #[serde(default)]
    preferred: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PersonCreate {
    gender: Gender,
    #[serde(default)]
    birthdate: Option<NaiveDate>,
    #[serde(default)]
    birthdate_estimated: bool,
    #[serde(default)]
    dead: bool,
    names: Vec<NameInput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PersonUpdate {
    gender: Option<Gender>,
    birthdate: Option<NaiveDate>,
    birthdate_estimated: Option<bool>,
    dead: Option<bool>,
    names: Option<Vec<NameInput>>,
}

pub struct PersonResource {
    store: Arc<dyn EntityStore<Person>>,
    patients: Arc<dyn EntityStore<Patient>>,
}

impl PersonResource {
    pub fn new(datastore: &Datastore) -> Self {
        Self {
            store: datastore.persons.clone(),
            patients: datastore.patients.clone(),
        }
    }
}

/// Validate name inputs and turn them into stored names.
///
/// Names keep their UUID when the input names one of `existing`. Exactly one
/// name ends up preferred; the first is chosen when none is marked.
fn build_names(inputs: Vec<NameInput>, existing: &[PersonName]) -> Result<Vec<PersonName>> {
    if inputs.is_empty() {
        return Err(Error::Validation(
            "A person must have at least one name".to_string(),
        ));
    }
    if inputs.iter().filter(|input| input.preferred).count() > 1 {
        return Err(Error::Validation(
            "Only one name can be preferred".to_string(),
        ));
    }

    let mut names = Vec::with_capacity(inputs.len());
    for input in inputs {
        input.validate()?;
        let uuid = match input.uuid {
            Some(uuid) if existing.iter().any(|name| name.uuid == uuid) => uuid,
            Some(uuid) => {
                return Err(Error::Conversion(format!(
                    "Name {uuid} does not belong to this person"
                )))
            }
            None => Uuid::new_v4(),
        };
        let name = PersonName {
            uuid,
            given_name: input.given_name,
            middle_name: input.middle_name,
            family_name: input.family_name,
            preferred: input.preferred,
        };
        if name.is_blank() {
            return Err(Error::Validation(
                "A name needs at least one non-blank part".to_string(),
            ));
        }
        names.push(name);
    }

    if !names.iter().any(|name| name.preferred) {
        names[0].preferred = true;
    }
    Ok(names)
}

fn check_birthdate(birthdate: Option<NaiveDate>) -> Result<()> {
    match birthdate {
        Some(date) if date > Utc::now().date_naive() => Err(Error::Validation(format!(
            "Birthdate {date} is in the future"
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl DelegatingResource for PersonResource {
    type Entity = Person;
    type View = Person;

    fn name(&self) -> &'static str {
        "person"
    }

    fn store(&self) -> &Arc<dyn EntityStore<Person>> {
        &self.store
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            get_all: true,
            search: true,
            create: true,
            update: true,
            void: true,
            purge: true,
        }
    }

    async fn view(&self, entity: Person) -> Result<Person> {
        Ok(entity)
    }

    fn search_document(&self, view: &Person) -> SearchDocument {
        let texts: Vec<String> = view.names.iter().map(PersonName::full_name).collect();
        SearchDocument::new(&person_display(view), texts, view.void_info.voided)
    }

    async fn new_entity(&self, payload: JsonValue) -> Result<Person> {
        let body: PersonCreate = parse_payload(self.name(), payload)?;
        check_birthdate(body.birthdate)?;

        let mut person = Person::new(body.gender, build_names(body.names, &[])?);
        person.birthdate = body.birthdate;
        person.birthdate_estimated = body.birthdate_estimated;
        person.dead = body.dead;
        Ok(person)
    }

    async fn apply_update(&self, mut person: Person, payload: JsonValue) -> Result<Person> {
        let body: PersonUpdate = parse_payload(self.name(), payload)?;
        check_birthdate(body.birthdate)?;

        if let Some(names) = body.names {
            person.names = build_names(names, &person.names)?;
        }
        if let Some(gender) = body.gender {
            person.gender = gender;
        }
        if body.birthdate.is_some() {
            person.birthdate = body.birthdate;
        }
        if let Some(estimated) = body.birthdate_estimated {
            person.birthdate_estimated = estimated;
        }
        if let Some(dead) = body.dead {
            person.dead = dead;
        }
        Ok(person)
    }

    async fn before_purge(&self, person: &Person) -> Result<()> {
        let referencing: Vec<Uuid> = self
            .patients
            .list(true)
            .await?
            .into_iter()
            .filter(|patient| patient.person == person.uuid)
            .map(|patient| patient.uuid)
            .collect();

        if let Some(patient) = referencing.first() {
            return Err(Error::ReferentialIntegrity(format!(
                "person/{} is referenced by patient/{patient}",
                person.uuid
            )));
        }
        Ok(())
    }
}

pub(crate) fn person_display(person: &Person) -> String {
    person
        .preferred_name()
        .map(PersonName::full_name)
        .unwrap_or_default()
}

impl Representable for Person {
    fn resource_name(&self) -> &'static str {
        "person"
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn display(&self) -> String {
        person_display(self)
    }

    fn is_voided(&self) -> bool {
        self.void_info.voided
    }

    fn audit_info(&self) -> Option<SimpleObject> {
        Some(audit_object(&self.audit, &self.void_info))
    }

    fn properties(&self, level: Level) -> &'static [Property] {
        match level {
            Level::Full => PERSON_FULL,
            Level::Default | Level::Ref => PERSON_DEFAULT,
        }
    }

    fn property(
        &self,
        name: &str,
        repr: &Representation,
        ctx: &RepresentationContext,
    ) -> Result<Option<JsonValue>> {
        let value = match name {
            "gender" => json!(self.gender.as_str()),
            "age" => json!(self.age(ctx.today)),
            "birthdate" => json!(self.birthdate),
            "birthdateEstimated" => json!(self.birthdate_estimated),
            "dead" => json!(self.dead),
            "preferredName" => match self.preferred_name() {
                Some(name) => nested(&NameView::new(self.uuid, name), repr, ctx)?,
                None => JsonValue::Null,
            },
            "names" => {
                let views: Vec<NameView> = self
                    .names
                    .iter()
                    .map(|name| NameView::new(self.uuid, name))
                    .collect();
                nested_list(&views, repr, ctx)?
            }
            "voided" => json!(self.void_info.voided),
            "voidReason" => json!(self.void_info.void_reason),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// A person name rendered as a sub-resource of its person.
pub struct NameView<'a> {
    person: Uuid,
    name: &'a PersonName,
}

impl<'a> NameView<'a> {
    pub fn new(person: Uuid, name: &'a PersonName) -> Self {
        Self { person, name }
    }
}

impl Representable for NameView<'_> {
    fn resource_name(&self) -> &'static str {
        "name"
    }

    fn uuid(&self) -> Uuid {
        self.name.uuid
    }

    fn display(&self) -> String {
        self.name.full_name()
    }

    fn self_path(&self) -> String {
        format!("person/{}/name/{}", self.person, self.name.uuid)
    }

    fn properties(&self, _level: Level) -> &'static [Property] {
        NAME_PROPERTIES
    }

    fn property(
        &self,
        name: &str,
        _repr: &Representation,
        _ctx: &RepresentationContext,
    ) -> Result<Option<JsonValue>> {
        Ok(match name {
            "givenName" => Some(json!(self.name.given_name)),
            "middleName" => Some(json!(self.name.middle_name)),
            "familyName" => Some(json!(self.name.family_name)),
            "preferred" => Some(json!(self.name.preferred)),
            _ => None,
        })
    }
}
