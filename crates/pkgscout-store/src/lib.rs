// Key-value persistence for pkgscout
// The local-storage slot the favorites list lives in

pub mod kv;
pub mod sqlite;

pub use kv::{KeyValueStore, MemoryStore, Result, StoreError};
pub use sqlite::SqliteStore;
