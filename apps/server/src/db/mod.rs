//! Storage layer

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::EntityStore;

use records_models::{Location, Patient, PatientIdentifierType, Person};
use std::sync::Arc;

/// One store per entity type, shared by every resource that reads it.
#[derive(Clone)]
pub struct Datastore {
    pub persons: Arc<dyn EntityStore<Person>>,
    pub patients: Arc<dyn EntityStore<Patient>>,
    pub locations: Arc<dyn EntityStore<Location>>,
    pub identifier_types: Arc<dyn EntityStore<PatientIdentifierType>>,
}

impl Datastore {
    pub fn in_memory() -> Self {
        Self {
            persons: Arc::new(MemoryStore::new("person")),
            patients: Arc::new(MemoryStore::new("patient")),
            locations: Arc::new(MemoryStore::new("location")),
            identifier_types: Arc::new(MemoryStore::new("patientidentifiertype")),
        }
    }
}
