// parceltrace-core: Canonical package records and reconciliation logic
// between parceltrace-api and consumers.

pub mod config;
pub mod error;
pub mod extract;
pub mod location;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod store;
pub mod tracker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::TrackerConfig;
pub use error::CoreError;
pub use model::{Field, PackagePatch, TrackedPackage};
pub use reconcile::SubmitOutcome;
pub use session::SessionDisposition;
pub use storage::{JsonStorage, StorageBackend};
pub use store::{PackageMap, PackageStore};
pub use tracker::{CycleReport, Tracker};
