//! Clinical record types
//!
//! Plain data representation of the records exposed by the chartkeeper REST
//! layer. No validation and no persistence here: the server owns both.

pub mod audit;
pub mod metadata;
pub mod patient;
pub mod person;

pub use audit::{Auditable, AuditInfo, Identifiable, VoidInfo, Voidable};
pub use metadata::{Location, PatientIdentifierType};
pub use patient::{Patient, PatientIdentifier};
pub use person::{Gender, Person, PersonName};
