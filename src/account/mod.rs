//! Account state module.
//!
//! Tracks every started account together with its command prefixes,
//! and persists prefix changes through a preference store.

mod prefix;
mod registry;
mod store;

pub use prefix::{DEFAULT_PREFIX, PrefixError, PrefixSet};
pub use registry::{AccountId, AccountProfile, AccountRegistry};
pub use store::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore, StoreError};
