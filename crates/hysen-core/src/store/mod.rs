// ── Status cache ──
//
// Single-writer cache for one device. Readers get immutable `Arc` snapshots;
// every change is published through one `watch` channel so subscribers see
// the snapshot, refresh bookkeeping, and preset override move together.

mod status_store;

pub use status_store::{CacheState, RefreshStatus, StatusStore};
