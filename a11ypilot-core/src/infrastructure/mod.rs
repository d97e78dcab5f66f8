//! In-memory implementations of the collaborator ports

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::audit::{AggregatedScan, RepositoryError, ScanRepository, UsageGate, UsageRejected};

/// Process-local scan storage
#[derive(Default)]
pub struct InMemoryScanRepository {
    scans: RwLock<HashMap<Uuid, AggregatedScan>>,
}

impl InMemoryScanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.scans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.scans.read().await.is_empty()
    }
}

#[async_trait]
impl ScanRepository for InMemoryScanRepository {
    async fn save(&self, scan: &AggregatedScan) -> Result<(), RepositoryError> {
        self.scans.write().await.insert(scan.id, scan.clone());
        tracing::debug!(scan_id = %scan.id, url = %scan.url, "Scan stored");
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<AggregatedScan>, RepositoryError> {
        Ok(self.scans.read().await.get(id).cloned())
    }
}

/// Usage gate that never rejects
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllUsage;

#[async_trait]
impl UsageGate for AllowAllUsage {
    async fn check(&self, _url: &str) -> Result<(), UsageRejected> {
        Ok(())
    }
}
