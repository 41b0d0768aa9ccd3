//! Startup tasks: seed data loading and search index rebuild

use chrono::Utc;
use records_models::{
    AuditInfo, Auditable, Location, Patient, PatientIdentifierType, Person, Voidable,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::{
    db::{Datastore, EntityStore},
    resources::ResourceRegistry,
    Error, Result,
};

/// Records loaded into an empty store, in dependency order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub patient_identifier_types: Vec<PatientIdentifierType>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

impl SeedData {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Internal(format!("Failed to read seed file {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
            .map_err(|e| Error::Internal(format!("Invalid seed file {}: {e}", path.display())))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::BadRequest(e.to_string()))
    }
}

async fn insert_all<E>(
    store: &Arc<dyn EntityStore<E>>,
    records: Vec<E>,
    user: &str,
) -> Result<usize>
where
    E: Voidable + Clone + Send + Sync + 'static,
{
    let count = records.len();
    for mut record in records {
        if !record.audit().is_stamped() {
            *record.audit_mut() = AuditInfo::created_by(user, Utc::now());
        }
        store.insert(record).await?;
    }
    Ok(count)
}

/// Seed patients must only link records loaded before them.
async fn check_seed_patient(datastore: &Datastore, patient: &Patient) -> Result<()> {
    if datastore.persons.get(&patient.person).await?.is_none() {
        return Err(Error::Validation(format!(
            "Seed patient {} refers to unknown person {}",
            patient.uuid, patient.person
        )));
    }
    for identifier in &patient.identifiers {
        if datastore
            .identifier_types
            .get(&identifier.identifier_type)
            .await?
            .is_none()
        {
            return Err(Error::Validation(format!(
                "Seed patient {} identifier '{}' has unknown identifier type {}",
                patient.uuid, identifier.identifier, identifier.identifier_type
            )));
        }
        if datastore.locations.get(&identifier.location).await?.is_none() {
            return Err(Error::Validation(format!(
                "Seed patient {} identifier '{}' has unknown location {}",
                patient.uuid, identifier.identifier, identifier.location
            )));
        }
    }
    Ok(())
}

/// Insert seed records, stamping audit data that the seed leaves empty.
pub async fn load_seed_data(
    datastore: &Datastore,
    seed: SeedData,
    system_user: &str,
) -> Result<()> {
    let locations = insert_all(&datastore.locations, seed.locations, system_user).await?;
    let identifier_types =
        insert_all(&datastore.identifier_types, seed.patient_identifier_types, system_user).await?;
    let persons = insert_all(&datastore.persons, seed.persons, system_user).await?;

    for patient in &seed.patients {
        check_seed_patient(datastore, patient).await?;
    }
    let patients = insert_all(&datastore.patients, seed.patients, system_user).await?;

    tracing::info!(
        locations,
        identifier_types,
        persons,
        patients,
        "Seed data loaded"
    );
    Ok(())
}

/// Rebuild every resource's search entries from the store.
pub async fn rebuild_search_index(registry: &ResourceRegistry) -> Result<usize> {
    let mut total = 0;
    for resource in registry.iter() {
        total += resource.rebuild_index().await?;
    }
    tracing::info!(documents = total, "Search index rebuilt");
    Ok(total)
}
