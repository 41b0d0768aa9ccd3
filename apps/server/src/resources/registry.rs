//! Maps path segments to resources

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    identifier_type::PatientIdentifierTypeResource, location::LocationResource,
    patient::PatientResource, person::PersonResource, ResourceController, RestResource,
};
use crate::{
    config::RestConfig,
    db::Datastore,
    hooks::{PatientReindexHook, ResourceHook},
    search::SearchIndex,
    Error, Result,
};

#[derive(Default)]
pub struct ResourceRegistry {
    resources: HashMap<&'static str, Arc<dyn RestResource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The patient, person, location and identifier type resources over one datastore.
    pub fn standard(
        datastore: &Datastore,
        search_index: Arc<SearchIndex>,
        rest: &RestConfig,
    ) -> Self {
        let patient: Arc<dyn RestResource> = Arc::new(ResourceController::new(
            PatientResource::new(datastore),
            search_index.clone(),
            rest.clone(),
        ));
        let reindex_patients: Arc<dyn ResourceHook> = Arc::new(PatientReindexHook::new(
            datastore.patients.clone(),
            patient.clone(),
        ));
        let person = ResourceController::new(
            PersonResource::new(datastore),
            search_index.clone(),
            rest.clone(),
        )
        .with_hooks(vec![reindex_patients]);

        let mut registry = Self::new();
        registry.register(patient);
        registry.register(Arc::new(person));
        registry.register(Arc::new(ResourceController::new(
            LocationResource::new(datastore),
            search_index.clone(),
            rest.clone(),
        )));
        registry.register(Arc::new(ResourceController::new(
            PatientIdentifierTypeResource::new(datastore),
            search_index,
            rest.clone(),
        )));
        registry
    }

    pub fn register(&mut self, resource: Arc<dyn RestResource>) {
        self.resources.insert(resource.name(), resource);
    }

    /// Look up a resource by path segment, case-insensitively.
    pub fn get(&self, name: &str) -> Result<Arc<dyn RestResource>> {
        self.resources
            .get(name.to_ascii_lowercase().as_str())
            .cloned()
            .ok_or_else(|| Error::UnknownResource(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.resources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RestResource>> {
        self.resources.values()
    }
}
