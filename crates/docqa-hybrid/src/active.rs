use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use docqa_core::error::{Error, Result};

use crate::index_set::IndexSet;

/// Holder for the index set queries run against.
///
/// Publishing swaps the whole `Arc` under the write lock, so a reader sees
/// either the previous set or the new one, never a mix. Readers hold the
/// lock only long enough to clone the `Arc`.
#[derive(Default)]
pub struct ActiveIndex {
    slot: RwLock<Option<(u64, Arc<IndexSet>)>>,
}

impl ActiveIndex {
    pub fn new() -> Self { Self::default() }

    /// Makes `set` current and returns its generation (1 for the first publish).
    pub fn publish(&self, set: Arc<IndexSet>) -> u64 {
        let mut slot = self.slot.write();
        let generation = slot.as_ref().map(|(g, _)| g + 1).unwrap_or(1);
        info!("Publishing index generation {} ({} chunks)", generation, set.len());
        *slot = Some((generation, set));
        generation
    }

    pub fn current(&self) -> Result<(u64, Arc<IndexSet>)> {
        self.slot.read().as_ref().map(|(g, set)| (*g, Arc::clone(set))).ok_or(Error::NotReady)
    }

    pub fn generation(&self) -> Option<u64> { self.slot.read().as_ref().map(|(g, _)| *g) }

    pub fn is_ready(&self) -> bool { self.slot.read().is_some() }
}
