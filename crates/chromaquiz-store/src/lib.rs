//! chromaquiz-store — Key-value backends for persistent stats.
//!
//! Implements [`KeyValueStore`](chromaquiz_core::traits::KeyValueStore) in
//! memory and as a JSON file on disk. Wrap either in
//! [`KvStatsStore`](chromaquiz_core::stats::KvStatsStore) to get a stats
//! store the engine can use.

pub mod file;
pub mod memory;

pub use file::{default_stats_path, open_stats_store, JsonFileKv};
pub use memory::MemoryKv;
