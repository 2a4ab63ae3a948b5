mod handler;

pub use handler::{
    DistanceResponse, clear_location, distance_to, get_location, permission_status,
    refresh_location, report_position,
};
