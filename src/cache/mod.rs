// 缓存模块
// 包含键值存储、缓存数据结构和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use models::CachedLocationRecord;
pub use operations::LocationCache;
pub use store::{KeyValueStore, MemoryStore, RedisStore};
