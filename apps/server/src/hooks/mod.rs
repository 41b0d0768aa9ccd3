//! Resource lifecycle hooks
//!
//! Hooks run after a write has been persisted and indexed. A failing hook
//! fails the request; the write itself is not rolled back.

pub mod patient_index;

pub use patient_index::PatientReindexHook;

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;

#[async_trait]
pub trait ResourceHook: Send + Sync {
    /// Called after a create or update.
    async fn on_saved(&self, _resource: &str, _uuid: &Uuid) -> Result<()> {
        Ok(())
    }

    async fn on_voided(&self, _resource: &str, _uuid: &Uuid) -> Result<()> {
        Ok(())
    }

    async fn on_purged(&self, _resource: &str, _uuid: &Uuid) -> Result<()> {
        Ok(())
    }
}
