// ── In-memory package store ──

use indexmap::IndexMap;

use crate::model::TrackedPackage;

/// Packages keyed by tracking id, insertion order preserved so that
/// listings come back in the order packages were added.
pub type PackageMap = IndexMap<String, TrackedPackage>;

/// Owned view of every tracked package. All access during a poll cycle
/// goes through `&mut self`; persistence snapshots [`as_map`].
///
/// [`as_map`]: PackageStore::as_map
#[derive(Debug, Clone, Default)]
pub struct PackageStore {
    packages: PackageMap,
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(packages: PackageMap) -> Self {
        Self { packages }
    }

    pub fn get(&self, tracking_id: &str) -> Option<&TrackedPackage> {
        self.packages.get(tracking_id)
    }

    /// Insert or replace the record under its own tracking id.
    pub fn put(&mut self, record: TrackedPackage) {
        self.packages.insert(record.tracking_id.clone(), record);
    }

    /// Remove a record; `None` if the id was never tracked.
    pub fn remove(&mut self, tracking_id: &str) -> Option<TrackedPackage> {
        self.packages.shift_remove(tracking_id)
    }

    pub fn all(&self) -> impl Iterator<Item = &TrackedPackage> {
        self.packages.values()
    }

    pub fn tracking_ids(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn as_map(&self) -> &PackageMap {
        &self.packages
    }
}
