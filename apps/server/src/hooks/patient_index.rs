//! Keeps patient search entries in step with their person.
//!
//! Patient documents carry the person's names, so a person edit or void has
//! to refresh every patient that points at that person.

use async_trait::async_trait;
use records_models::Patient;
use std::sync::Arc;
use uuid::Uuid;

use super::ResourceHook;
use crate::{db::EntityStore, resources::RestResource, Result};

pub struct PatientReindexHook {
    patients: Arc<dyn EntityStore<Patient>>,
    patient_resource: Arc<dyn RestResource>,
}

impl PatientReindexHook {
    pub fn new(
        patients: Arc<dyn EntityStore<Patient>>,
        patient_resource: Arc<dyn RestResource>,
    ) -> Self {
        Self {
            patients,
            patient_resource,
        }
    }

    async fn reindex_patients_of(&self, person: &Uuid) -> Result<()> {
        let affected: Vec<Uuid> = self
            .patients
            .list(true)
            .await?
            .into_iter()
            .filter(|patient| patient.person == *person)
            .map(|patient| patient.uuid)
            .collect();

        for uuid in &affected {
            self.patient_resource.reindex(uuid).await?;
        }

        if !affected.is_empty() {
            tracing::debug!(
                person = %person,
                patients = affected.len(),
                "Reindexed patients after person change"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceHook for PatientReindexHook {
    async fn on_saved(&self, resource: &str, uuid: &Uuid) -> Result<()> {
        if resource == "person" {
            self.reindex_patients_of(uuid).await?;
        }
        Ok(())
    }

    async fn on_voided(&self, resource: &str, uuid: &Uuid) -> Result<()> {
        if resource == "person" {
            self.reindex_patients_of(uuid).await?;
        }
        Ok(())
    }
}
