use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::CoordinatorError;
use crate::record::{ShadowPlan, ShadowStatus};

/// Durable store for shadow records. Reads may run concurrently; writes to a
/// given record are serialized through the version check: an `update` whose
/// `expected_version` no longer matches fails with `VersionConflict` instead
/// of overwriting a concurrent change.
pub trait ShadowStore: Send + Sync {
    /// Persist a new record, assigning its local id
    fn insert(&self, plan: ShadowPlan) -> Result<u64, CoordinatorError>;

    fn get(&self, local_id: u64) -> Result<ShadowPlan, CoordinatorError>;

    /// Replace the record if `expected_version` still matches, bumping the
    /// stored version
    fn update(&self, plan: ShadowPlan, expected_version: u64) -> Result<(), CoordinatorError>;

    /// Records the notification job needs to look at
    fn list_active(&self) -> Result<Vec<ShadowPlan>, CoordinatorError>;
}

/// In-memory store used by tests and single-process deployments.
pub struct MemoryShadowStore {
    plans: Mutex<HashMap<u64, ShadowPlan>>,
    next_id: AtomicU64,
}

impl MemoryShadowStore {
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryShadowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowStore for MemoryShadowStore {
    fn insert(&self, mut plan: ShadowPlan) -> Result<u64, CoordinatorError> {
        let local_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        plan.local_id = local_id;
        plan.version = 1;
        let mut plans = self.plans.lock().expect("store poisoned");
        plans.insert(local_id, plan);
        Ok(local_id)
    }

    fn get(&self, local_id: u64) -> Result<ShadowPlan, CoordinatorError> {
        let plans = self.plans.lock().expect("store poisoned");
        plans
            .get(&local_id)
            .cloned()
            .ok_or(CoordinatorError::NotFound {})
    }

    fn update(&self, mut plan: ShadowPlan, expected_version: u64) -> Result<(), CoordinatorError> {
        let mut plans = self.plans.lock().expect("store poisoned");
        let current = plans
            .get(&plan.local_id)
            .ok_or(CoordinatorError::NotFound {})?;
        if current.version != expected_version {
            return Err(CoordinatorError::VersionConflict {});
        }
        plan.version = expected_version + 1;
        plans.insert(plan.local_id, plan);
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<ShadowPlan>, CoordinatorError> {
        let plans = self.plans.lock().expect("store poisoned");
        let mut active: Vec<ShadowPlan> = plans
            .values()
            .filter(|p| p.status == ShadowStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(|p| p.local_id);
        Ok(active)
    }
}
