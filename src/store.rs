//! Storage boundary.
//!
//! The core computes over in-memory snapshots; these traits are the only
//! places it touches the outside world: committing proposals one slot at
//! a time, persisting rotation queues, and reading the local-needs
//! pre-assignment queue. Adapters implement them against whatever store
//! the application uses; the in-memory implementations here back tests
//! and embedded use.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::queues::{QueueMap, RotationGroup, RotationQueue};

/// Failure at the storage boundary.
///
/// Each committed slot is its own failure domain; the generator turns
/// these into warnings and keeps going.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Write-side sink for assignment proposals.
pub trait ProposalSink {
    /// Writes one proposal. Independent per slot; no cross-slot
    /// transaction.
    fn commit_proposal(&mut self, slot_id: &str, person_name: &str) -> Result<(), StoreError>;
}

/// Persistence for rotation queues and cursors.
pub trait QueueStore {
    fn load_queues(&self) -> Result<QueueMap, StoreError>;
    /// Replaces all queues wholesale.
    fn save_queues(&mut self, queues: &QueueMap) -> Result<(), StoreError>;
}

/// A pre-assigned local-needs talk waiting for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNeedsEntry {
    pub id: String,
    pub theme: String,
    /// Week this entry is reserved for; `None` = next free slot.
    pub target_week: Option<String>,
    pub assignee_name: String,
}

/// Read/consume access to the local-needs pre-assignment queue.
pub trait LocalNeedsSource {
    /// Unconsumed entries, oldest first.
    fn pending_queue(&self) -> Result<Vec<LocalNeedsEntry>, StoreError>;
    /// Marks an entry as used by a slot.
    fn consume_entry(&mut self, entry_id: &str, slot_id: &str) -> Result<(), StoreError>;
}

/// In-memory proposal sink.
#[derive(Debug, Default)]
pub struct MemoryProposalSink {
    /// Committed (slot id, person name) pairs, in commit order.
    pub committed: Vec<(String, String)>,
    /// Slot ids that fail on commit, for exercising partial failure.
    pub fail_on: HashSet<String>,
}

impl MemoryProposalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProposalSink for MemoryProposalSink {
    fn commit_proposal(&mut self, slot_id: &str, person_name: &str) -> Result<(), StoreError> {
        if self.fail_on.contains(slot_id) {
            return Err(StoreError::Backend(format!("write rejected for {slot_id}")));
        }
        self.committed
            .push((slot_id.to_string(), person_name.to_string()));
        Ok(())
    }
}

/// In-memory queue store.
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    queues: QueueMap,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue for one group, if present.
    pub fn queue(&self, group: RotationGroup) -> Option<&RotationQueue> {
        self.queues.get(&group)
    }
}

impl QueueStore for MemoryQueueStore {
    fn load_queues(&self) -> Result<QueueMap, StoreError> {
        Ok(self.queues.clone())
    }

    fn save_queues(&mut self, queues: &QueueMap) -> Result<(), StoreError> {
        self.queues = queues.clone();
        Ok(())
    }
}

/// In-memory local-needs queue.
#[derive(Debug, Default)]
pub struct MemoryLocalNeeds {
    pub entries: Vec<LocalNeedsEntry>,
    /// (entry id, slot id) consumption log.
    pub consumed: Vec<(String, String)>,
    consumed_ids: HashMap<String, String>,
}

impl MemoryLocalNeeds {
    pub fn new(entries: Vec<LocalNeedsEntry>) -> Self {
        Self {
            entries,
            consumed: Vec::new(),
            consumed_ids: HashMap::new(),
        }
    }
}

impl LocalNeedsSource for MemoryLocalNeeds {
    fn pending_queue(&self) -> Result<Vec<LocalNeedsEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| !self.consumed_ids.contains_key(&e.id))
            .cloned()
            .collect())
    }

    fn consume_entry(&mut self, entry_id: &str, slot_id: &str) -> Result<(), StoreError> {
        if !self.entries.iter().any(|e| e.id == entry_id) {
            return Err(StoreError::NotFound(format!("local-needs entry {entry_id}")));
        }
        self.consumed_ids
            .insert(entry_id.to_string(), slot_id.to_string());
        self.consumed.push((entry_id.to_string(), slot_id.to_string()));
        Ok(())
    }
}
