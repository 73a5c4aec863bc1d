pub mod cache;
pub mod keys;
pub mod kv;

mod macros;

pub use cache::{CacheWriterHandle, ResponseCache};
pub use keys::{CacheKey, StorageKey, GUEST_PARTITION};
pub use kv::{get_json, set_json, KeyValueStore, MemoryStore, RedisStore};
