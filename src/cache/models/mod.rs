/// 缓存数据模型

// 定位缓存模型
pub mod location;

pub use location::CachedLocationRecord;
