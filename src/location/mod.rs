//! 定位子系统
//!
//! 权限 → 设备定位 → 逆地理编码 → 缓存，由 [`LocationSession`] 统一编排。

pub mod coordinate;
pub mod distance;
pub mod geocode;
pub mod permission;
pub mod position;
pub mod session;

pub use coordinate::{Coordinate, ResolvedLocation};
pub use distance::{distance, format_distance, round_km};
pub use geocode::{GeocodeClient, ReverseGeocoder, fallback_address};
pub use permission::{AlwaysGranted, PermissionGate, PermissionProvider, PermissionState, PermissionStatus};
pub use position::{FixedPositionProvider, PositionProvider, ReportedPositionProvider};
pub use session::{LocationSession, LocationSessionState};
