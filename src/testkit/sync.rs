//! Sync target doubles.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::{SyncEntry, SyncTarget};

/// Accepts every batch and keeps a copy for assertions.
#[derive(Clone, Default)]
pub struct RecordingSyncTarget {
    batches: Arc<Mutex<Vec<Vec<SyncEntry>>>>,
}

impl RecordingSyncTarget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches received so far, in order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<SyncEntry>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl SyncTarget for RecordingSyncTarget {
    async fn push(&self, batch: &[SyncEntry]) -> Result<()> {
        self.batches.lock().push(batch.to_vec());
        Ok(())
    }

    fn target_name(&self) -> &'static str {
        "recording"
    }
}

/// Rejects every batch.
#[derive(Clone, Copy, Default)]
pub struct FailingSyncTarget;

#[async_trait]
impl SyncTarget for FailingSyncTarget {
    async fn push(&self, _batch: &[SyncEntry]) -> Result<()> {
        Err(Error::SyncFailed("aggregator offline".into()))
    }

    fn target_name(&self) -> &'static str {
        "failing"
    }
}
