//! Cache Module
//!
//! Provides the read-through LRU cache with lazy TTL expiry.

mod engine;
mod entry;
mod list;
mod stats;


// Re-export public types
pub use engine::LruCache;
pub use entry::{Node, NodeId};
pub use list::EvictionList;
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
