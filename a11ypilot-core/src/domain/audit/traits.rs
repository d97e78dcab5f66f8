//! Collaborator ports consumed by the audit pipeline

use async_trait::async_trait;
use uuid::Uuid;

use super::entities::AggregatedScan;

/// Persistence failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize scan: {0}")]
    Serialization(String),
}

/// Request rejected by the usage collaborator before any scanning starts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Scan request rejected: {reason}")]
pub struct UsageRejected {
    pub reason: String,
}

impl UsageRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Storage for finished aggregate scans
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// Store a finished scan
    async fn save(&self, scan: &AggregatedScan) -> Result<(), RepositoryError>;

    /// Retrieve a scan by its identifier
    async fn get(&self, id: &Uuid) -> Result<Option<AggregatedScan>, RepositoryError>;
}

/// Usage/quota check performed before a scan request runs
#[async_trait]
pub trait UsageGate: Send + Sync {
    /// Reject the request for `url` or let it through
    async fn check(&self, url: &str) -> Result<(), UsageRejected>;
}
