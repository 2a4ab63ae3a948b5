/// 最近一次定位结果的存储键
pub const USER_LOCATION_KEY: &str = "userLocation";
