//! Audit metadata and the identity/void traits shared by every record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Creation and modification metadata.
///
/// A record loaded from seed data may omit this block; an empty `creator`
/// marks it as unstamped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_changed: Option<DateTime<Utc>>,
}

impl AuditInfo {
    pub fn created_by(user: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            creator: user.into(),
            date_created: at,
            changed_by: None,
            date_changed: None,
        }
    }

    pub fn is_stamped(&self) -> bool {
        !self.creator.is_empty()
    }

    /// Record a modification.
    pub fn touch(&mut self, user: impl Into<String>, at: DateTime<Utc>) {
        self.changed_by = Some(user.into());
        self.date_changed = Some(at);
    }
}

/// Soft-delete state. Metadata records reuse it as their "retired" state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidInfo {
    #[serde(default)]
    pub voided: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_voided: Option<DateTime<Utc>>,
}

pub trait Identifiable {
    fn uuid(&self) -> Uuid;
}

pub trait Auditable: Identifiable {
    fn audit(&self) -> &AuditInfo;
    fn audit_mut(&mut self) -> &mut AuditInfo;
}

pub trait Voidable: Auditable {
    fn void_info(&self) -> &VoidInfo;
    fn void_info_mut(&mut self) -> &mut VoidInfo;

    fn is_voided(&self) -> bool {
        self.void_info().voided
    }

    /// Mark the record voided. The data itself is kept.
    fn void(&mut self, reason: impl Into<String>, user: impl Into<String>, at: DateTime<Utc>)
    where
        Self: Sized,
    {
        let info = self.void_info_mut();
        info.voided = true;
        info.void_reason = Some(reason.into());
        info.voided_by = Some(user.into());
        info.date_voided = Some(at);
    }
}

/// Implements the identity, audit and void traits for a record with
/// `uuid`, `audit` and the named void field.
#[macro_export]
macro_rules! impl_record {
    ($ty:ty, $void_field:ident) => {
        impl $crate::audit::Identifiable for $ty {
            fn uuid(&self) -> ::uuid::Uuid {
                self.uuid
            }
        }

        impl $crate::audit::Auditable for $ty {
            fn audit(&self) -> &$crate::audit::AuditInfo {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::audit::AuditInfo {
                &mut self.audit
            }
        }

        impl $crate::audit::Voidable for $ty {
            fn void_info(&self) -> &$crate::audit::VoidInfo {
                &self.$void_field
            }

            fn void_info_mut(&mut self) -> &mut $crate::audit::VoidInfo {
                &mut self.$void_field
            }
        }
    };
}
