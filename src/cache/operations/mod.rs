/// 缓存操作

// 定位缓存操作
pub mod location;

pub use location::LocationCache;
