/// 缓存键模块

// 定位缓存键
pub mod location_keys;

pub use location_keys::USER_LOCATION_KEY;
