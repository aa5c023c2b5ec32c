//! Batch-atomic undo for repair runs.
//!
//! A batch snapshots the whole file set before the first mutation of a
//! run and accumulates the id of every fix applied after it. Restoring
//! a batch returns the snapshot byte for byte, which also drops files
//! synthesized after it was taken. Batches are the atomic unit; there
//! is no fix-level cherry-picking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::pipeline::report::AppliedFix;
use crate::project::files::{FileSet, SourceFile};

pub type BatchId = Uuid;

/// One undo point and the ids of everything applied on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackBatch {
    pub id: BatchId,
    /// The complete file set as it was before the batch opened.
    pub original_files: Vec<SourceFile>,
    /// Ids of fixes applied while the batch was current, oldest first.
    pub fix_ids: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl RollbackBatch {
    fn open(files: &FileSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_files: files.snapshot(),
            fix_ids: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Rebuilds the file set exactly as it was at the snapshot.
    pub fn restore(&self) -> FileSet {
        FileSet::from_files(self.original_files.clone())
    }
}

/// Ordered record of every batch taken over a pipeline's lifetime.
#[derive(Debug, Default)]
pub struct RollbackLedger {
    batches: Vec<RollbackBatch>,
}

impl RollbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-copies the set and opens a new batch. Returns its id.
    pub fn snapshot(&mut self, files: &FileSet) -> BatchId {
        let batch = RollbackBatch::open(files);
        let id = batch.id;
        info!(batch = %id, files = files.len(), "opened rollback batch");
        self.batches.push(batch);
        id
    }

    /// Appends a fix to a batch's audit index.
    pub fn record_fix(&mut self, batch_id: BatchId, fix: &AppliedFix) {
        if let Some(batch) = self.batches.iter_mut().find(|b| b.id == batch_id) {
            batch.fix_ids.push(fix.id);
        }
    }

    pub fn batch(&self, batch_id: BatchId) -> Option<&RollbackBatch> {
        self.batches.iter().find(|b| b.id == batch_id)
    }

    pub fn last_batch(&self) -> Option<&RollbackBatch> {
        self.batches.last()
    }

    /// Returns the batch's snapshot and removes the batch and its fix
    /// ids from the ledger. `None` when the id is unknown.
    pub fn rollback(&mut self, batch_id: BatchId) -> Option<Vec<SourceFile>> {
        let position = self.batches.iter().position(|b| b.id == batch_id)?;
        let batch = self.batches.remove(position);
        info!(
            batch = %batch_id,
            files = batch.original_files.len(),
            undone = batch.fix_ids.len(),
            "rolled back to snapshot"
        );
        Some(batch.original_files)
    }

    /// Rolls back the most recent batch, if there is one.
    pub fn rollback_last(&mut self) -> Option<Vec<SourceFile>> {
        let id = self.batches.last()?.id;
        self.rollback(id)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
