//! Patient records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditInfo, VoidInfo};

/// An identifier issued to a patient at a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdentifier {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub identifier: String,
    pub identifier_type: Uuid,
    pub location: Uuid,
    #[serde(default)]
    pub preferred: bool,
}

/// A person registered for care.
///
/// `person` links the demographic record and never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub uuid: Uuid,
    pub person: Uuid,
    #[serde(default)]
    pub identifiers: Vec<PatientIdentifier>,
    #[serde(default)]
    pub audit: AuditInfo,
    #[serde(default)]
    pub void_info: VoidInfo,
}

impl Patient {
    pub fn new(person: Uuid, identifiers: Vec<PatientIdentifier>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person,
            identifiers,
            audit: AuditInfo::default(),
            void_info: VoidInfo::default(),
        }
    }

    /// The identifier flagged preferred, else the first one.
    pub fn preferred_identifier(&self) -> Option<&PatientIdentifier> {
        self.identifiers
            .iter()
            .find(|id| id.preferred)
            .or_else(|| self.identifiers.first())
    }
}

crate::impl_record!(Patient, void_info);
