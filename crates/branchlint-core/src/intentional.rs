//! The caller-owned "intentional cycle" port.
//!
//! The engine never stores which cycles are intentional. Callers pass any
//! [`IntentionalCycles`] implementation into validation, and the engine
//! only ever asks it yes/no questions.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

use crate::graph::CycleId;

/// Read-only lookup: is this cycle an acknowledged, deliberate loop?
pub trait IntentionalCycles {
    fn is_intentional(&self, id: &CycleId) -> bool;
}

/// Every cycle is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIntentionalCycles;

impl IntentionalCycles for NoIntentionalCycles {
    fn is_intentional(&self, _id: &CycleId) -> bool {
        false
    }
}

impl<F> IntentionalCycles for F
where
    F: Fn(&CycleId) -> bool,
{
    fn is_intentional(&self, id: &CycleId) -> bool {
        self(id)
    }
}

impl<S: BuildHasher> IntentionalCycles for HashSet<CycleId, S> {
    fn is_intentional(&self, id: &CycleId) -> bool {
        self.contains(id)
    }
}

impl IntentionalCycles for BTreeSet<CycleId> {
    fn is_intentional(&self, id: &CycleId) -> bool {
        self.contains(id)
    }
}

/// A stored `false` means explicitly un-marked.
impl<S: BuildHasher> IntentionalCycles for HashMap<CycleId, bool, S> {
    fn is_intentional(&self, id: &CycleId) -> bool {
        self.get(id).copied().unwrap_or(false)
    }
}

impl IntentionalCycles for BTreeMap<CycleId, bool> {
    fn is_intentional(&self, id: &CycleId) -> bool {
        self.get(id).copied().unwrap_or(false)
    }
}
