mod handler;
mod model;

pub use handler::rank_feed;
pub use model::{RankRequest, RankResponse};
