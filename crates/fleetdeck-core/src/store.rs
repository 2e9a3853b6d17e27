// ── Reactive machine store ──
//
// The in-memory mirror of the backend's machine list. Each poll replaces
// the snapshot wholesale (the backend is the sole source of truth), so
// unlike an incrementally-updated cache there is no merge logic — just an
// ordered snapshot plus an identity index for O(1) lookups.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{MacAddress, Machine};
use crate::stream::EntityStream;

/// Concurrent storage for the current machine list.
///
/// The snapshot preserves the backend's list order (cards render in that
/// order); `by_mac` is a secondary index for action correlation. Every
/// replacement bumps a version counter and republishes the snapshot to
/// watch subscribers.
pub struct MachineStore {
    /// Identity index: normalized MAC -> machine.
    by_mac: DashMap<String, Arc<Machine>>,

    /// Version counter, bumped on every replacement.
    version: watch::Sender<u64>,

    /// Full ordered snapshot, replaced on every successful poll.
    snapshot: watch::Sender<Arc<Vec<Arc<Machine>>>>,
}

impl Default for MachineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_mac: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the entire machine list with a fresh backend snapshot.
    ///
    /// Order is preserved. Machines absent from the new list disappear
    /// from the index — there is no tombstoning.
    pub fn replace_all(&self, machines: Vec<Machine>) {
        let snapshot: Vec<Arc<Machine>> = machines.into_iter().map(Arc::new).collect();

        self.by_mac.clear();
        for machine in &snapshot {
            self.by_mac
                .insert(machine.identity.as_str().to_owned(), Arc::clone(machine));
        }

        self.snapshot.send_modify(|snap| *snap = Arc::new(snapshot));
        self.version.send_modify(|v| *v += 1);
    }

    /// Look up a machine by its identity.
    pub fn get(&self, identity: &MacAddress) -> Option<Arc<Machine>> {
        self.by_mac
            .get(identity.as_str())
            .map(|r| Arc::clone(r.value()))
    }

    /// Resolve a user-supplied query to a machine: exact MAC match first,
    /// then unique display-name match. Ambiguous names are rejected —
    /// `identity` is the only key the client trusts.
    pub fn resolve(&self, query: &str) -> Result<Arc<Machine>, CoreError> {
        let as_mac = MacAddress::new(query);
        if let Some(machine) = self.get(&as_mac) {
            return Ok(machine);
        }

        let snapshot = self.snapshot();
        let matches: Vec<&Arc<Machine>> = snapshot
            .iter()
            .filter(|m| m.display_name == query)
            .collect();

        match matches.len() {
            0 => Err(CoreError::MachineNotFound {
                identifier: query.to_owned(),
            }),
            1 => Ok(Arc::clone(matches[0])),
            count => Err(CoreError::AmbiguousMachine {
                name: query.to_owned(),
                count,
            }),
        }
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<Machine>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> EntityStream<Machine> {
        EntityStream::new(self.snapshot.subscribe())
    }

    /// Subscribe to the raw version counter (test instrumentation).
    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn len(&self) -> usize {
        self.by_mac.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mac.is_empty()
    }
}
