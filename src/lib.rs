use config::Config;
use std::sync::Arc;

use location::{LocationSession, ReportedPositionProvider};

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod location;
pub mod middleware;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: LocationSession,
    pub reporter: Arc<ReportedPositionProvider>,
}
