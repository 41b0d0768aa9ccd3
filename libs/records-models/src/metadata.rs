//! Reference metadata linked from patient identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditInfo, VoidInfo};

/// A physical place where identifiers are issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub audit: AuditInfo,
    #[serde(default)]
    pub retired: VoidInfo,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: None,
            audit: AuditInfo::default(),
            retired: VoidInfo::default(),
        }
    }
}

crate::impl_record!(Location, retired);

/// The kind of a patient identifier (e.g. a national id or a legacy number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdentifierType {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub audit: AuditInfo,
    #[serde(default)]
    pub retired: VoidInfo,
}

impl PatientIdentifierType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: None,
            audit: AuditInfo::default(),
            retired: VoidInfo::default(),
        }
    }
}

crate::impl_record!(PatientIdentifierType, retired);
