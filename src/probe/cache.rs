//! Per-process memoization of probe results.
//!
//! Entries are keyed by probe identity, not by arguments: every cached probe
//! asks a fixed question. Nothing is persisted across processes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Whether a probe's answer may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Compute once, then reuse for the cache's lifetime.
    Memoize,
    /// Recompute on every call.
    Fresh,
}

/// A probe's identity and caching policy, fixed where the probe is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeDef {
    pub name: &'static str,
    pub policy: CachePolicy,
}

impl ProbeDef {
    pub const fn memoized(name: &'static str) -> Self {
        ProbeDef {
            name,
            policy: CachePolicy::Memoize,
        }
    }

    pub const fn fresh(name: &'static str) -> Self {
        ProbeDef {
            name,
            policy: CachePolicy::Fresh,
        }
    }
}

/// A stored probe result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    Bool(bool),
    Flag(Option<String>),
    Path(Option<PathBuf>),
}

/// Values a probe may return through the cache.
pub trait Cacheable: Sized {
    fn to_cached(&self) -> CachedValue;
    fn from_cached(value: &CachedValue) -> Option<Self>;
}

impl Cacheable for bool {
    fn to_cached(&self) -> CachedValue {
        CachedValue::Bool(*self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Cacheable for Option<String> {
    fn to_cached(&self) -> CachedValue {
        CachedValue::Flag(self.clone())
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Flag(f) => Some(f.clone()),
            _ => None,
        }
    }
}

impl Cacheable for Option<PathBuf> {
    fn to_cached(&self) -> CachedValue {
        CachedValue::Path(self.clone())
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Path(p) => Some(p.clone()),
            _ => None,
        }
    }
}

/// Memoized probe results.
///
/// The lock is never held while a probe runs. Probing is sequential, so two
/// callers racing on the same probe would at worst both compute it.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    entries: Mutex<HashMap<&'static str, CachedValue>>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored answer for `def`, or compute and store it.
    pub fn get_or_compute<T: Cacheable>(&self, def: &ProbeDef, compute: impl FnOnce() -> T) -> T {
        if def.policy == CachePolicy::Fresh {
            return compute();
        }

        if let Some(hit) = self.lookup(def.name).and_then(|v| T::from_cached(&v)) {
            tracing::trace!("cache hit for {}", def.name);
            return hit;
        }

        let value = compute();
        self.store(def.name, value.to_cached());
        value
    }

    /// Whether `name` has a stored answer.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &str) -> Option<CachedValue> {
        // A poisoned lock only means a probe panicked mid-store; treat as a miss.
        self.entries.lock().ok().and_then(|e| e.get(name).cloned())
    }

    fn store(&self, name: &'static str, value: CachedValue) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(name, value);
        }
    }
}
