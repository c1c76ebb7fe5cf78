//! Plan persistence trait.

use super::model::AssemblyPlanRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Stores cleaned assembly plans as external artifacts.
///
/// Records are immutable once written; each save creates a new artifact
/// keyed by the record's generation timestamp.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Writes the record and returns the artifact path shown to the user.
    async fn save(&self, record: &AssemblyPlanRecord) -> Result<PathBuf>;

    /// Path of the most recent plan, if any exists.
    async fn latest(&self) -> Result<Option<PathBuf>>;
}
