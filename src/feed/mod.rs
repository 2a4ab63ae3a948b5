//! 社区帖子排序

pub mod model;
pub mod ranking;

pub use model::{RankedPost, ShopPost, SortMode};
pub use ranking::{RankedFeed, rank_posts, search_posts};
