use super::Coordinate;

/// 地球半径（公里）
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine 球面距离，单位公里，不做舍入
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let delta_phi = (b.latitude() - a.latitude()).to_radians();
    let delta_lambda = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// 展示用：保留两位小数
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// 不足 1 公里按米显示，否则按公里显示
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{}km", round_km(km))
    }
}
