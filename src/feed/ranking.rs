use super::model::{RankedPost, ShopPost, SortMode};
use crate::location::{Coordinate, LocationSession, distance, format_distance};

/// 按当前位置排序社区帖子
pub struct RankedFeed<'a> {
    session: &'a LocationSession,
}

impl<'a> RankedFeed<'a> {
    pub fn new(session: &'a LocationSession) -> Self {
        Self { session }
    }

    pub fn rank(&self, posts: Vec<ShopPost>, mode: SortMode) -> Vec<RankedPost> {
        rank_posts(posts, mode, self.origin())
    }

    /// 半径内（公里）的帖子，按距离升序；没有当前位置时返回 None
    pub fn nearby(&self, posts: Vec<ShopPost>, radius_km: f64) -> Option<Vec<RankedPost>> {
        let origin = self.origin()?;
        let limit_meters = (radius_km * 1000.0).round() as i64;

        let ranked = rank_posts(posts, SortMode::Distance, Some(origin))
            .into_iter()
            .filter(|post| {
                post.distance_meters
                    .is_some_and(|meters| meters <= limit_meters)
            })
            .collect();
        Some(ranked)
    }

    fn origin(&self) -> Option<Coordinate> {
        self.session.current().map(|location| location.coordinate)
    }
}

/// 排序规则：
/// - `distance`：有坐标的按距离升序在前，无坐标的保持原顺序在后；没有原点时等同 `latest`
/// - `latest`：按创建时间降序
/// - `popular`：按 (点赞数, 浏览数) 降序
///
/// 全部使用稳定排序，相同键保持输入顺序。
pub fn rank_posts(
    posts: Vec<ShopPost>,
    mode: SortMode,
    origin: Option<Coordinate>,
) -> Vec<RankedPost> {
    let mut ranked: Vec<RankedPost> = posts
        .into_iter()
        .map(|post| annotate(post, origin))
        .collect();

    match (mode, origin) {
        (SortMode::Distance, Some(_)) => {
            let (mut near, far): (Vec<_>, Vec<_>) = ranked
                .into_iter()
                .partition(|post| post.distance_meters.is_some());
            near.sort_by_key(|post| post.distance_meters);
            near.extend(far);
            ranked = near;
        }
        (SortMode::Distance, None) | (SortMode::Latest, _) => {
            ranked.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        }
        (SortMode::Popular, _) => {
            ranked.sort_by(|a, b| {
                (b.post.like_count, b.post.view_count).cmp(&(a.post.like_count, a.post.view_count))
            });
        }
    }

    ranked
}

/// 关键字过滤：店名、地址、点评，不区分大小写
pub fn search_posts(posts: Vec<ShopPost>, keyword: &str) -> Vec<ShopPost> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return posts;
    }

    posts
        .into_iter()
        .filter(|post| {
            [&post.shop_name, &post.shop_location, &post.comment]
                .iter()
                .any(|field| field.to_lowercase().contains(&keyword))
        })
        .collect()
}

fn annotate(post: ShopPost, origin: Option<Coordinate>) -> RankedPost {
    let km = origin.zip(post.coordinate()).map(|(from, to)| distance(from, to));
    RankedPost {
        distance_meters: km.map(|km| (km * 1000.0).round() as i64),
        distance_label: km.map(format_distance),
        post,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    fn post(id: i64, coordinate: Option<(f64, f64)>, created: i64, likes: i64, views: i64) -> ShopPost {
        ShopPost {
            id,
            shop_name: format!("shop-{id}"),
            shop_location: String::new(),
            comment: String::new(),
            latitude: coordinate.map(|c| c.0),
            longitude: coordinate.map(|c| c.1),
            created_at: at(created),
            like_count: likes,
            view_count: views,
        }
    }

    fn ids(ranked: &[RankedPost]) -> Vec<i64> {
        ranked.iter().map(|p| p.post.id).collect()
    }

    fn beijing() -> Coordinate {
        Coordinate::new(39.9042, 116.4074).unwrap()
    }

    #[test]
    fn empty_input() {
        assert!(rank_posts(Vec::new(), SortMode::Distance, Some(beijing())).is_empty());
        assert!(rank_posts(Vec::new(), SortMode::Distance, None).is_empty());
    }

    #[test]
    fn distance_puts_unlocated_posts_last() {
        let a = post(1, Some((39.9042, 116.4084)), 0, 0, 0);
        let b = post(2, None, 10, 0, 0);
        let c = post(3, Some((40.0, 117.0)), 20, 0, 0);

        let ranked = rank_posts(vec![a, b, c], SortMode::Distance, Some(beijing()));
        assert_eq!(ids(&ranked), vec![1, 3, 2]);

        let a_meters = ranked[0].distance_meters.unwrap();
        assert!((80..=90).contains(&a_meters), "got {a_meters}");
        assert_eq!(ranked[0].distance_label.as_deref(), Some(format!("{a_meters}m").as_str()));
        let c_km = ranked[1].distance_meters.unwrap() as f64 / 1000.0;
        assert!((50.0..=100.0).contains(&c_km), "got {c_km}");
        assert_eq!(ranked[2].distance_meters, None);
    }

    #[test]
    fn distance_without_origin_matches_latest() {
        let posts = vec![
            post(1, Some((39.9, 116.4)), 5, 0, 0),
            post(2, None, 30, 0, 0),
            post(3, Some((40.0, 117.0)), 10, 0, 0),
        ];
        let by_distance = rank_posts(posts.clone(), SortMode::Distance, None);
        let by_latest = rank_posts(posts, SortMode::Latest, None);
        assert_eq!(ids(&by_distance), ids(&by_latest));
        assert_eq!(ids(&by_latest), vec![2, 3, 1]);
    }

    #[test]
    fn popular_orders_by_likes_then_views() {
        let posts = vec![
            post(1, None, 0, 5, 10),
            post(2, None, 0, 9, 1),
            post(3, None, 0, 5, 40),
            post(4, None, 0, 5, 10),
        ];
        let ranked = rank_posts(posts, SortMode::Popular, None);
        assert_eq!(ids(&ranked), vec![2, 3, 1, 4]);
    }

    #[test]
    fn ties_keep_input_order() {
        let posts = vec![
            post(1, Some((39.95, 116.45)), 0, 0, 0),
            post(2, None, 0, 0, 0),
            post(3, Some((39.95, 116.45)), 0, 0, 0),
            post(4, None, 0, 0, 0),
        ];
        let ranked = rank_posts(posts.clone(), SortMode::Distance, Some(beijing()));
        assert_eq!(ids(&ranked), vec![1, 3, 2, 4]);

        let ranked = rank_posts(posts, SortMode::Latest, None);
        assert_eq!(ids(&ranked), vec![1, 2, 3, 4]);
    }

    #[test]
    fn search_matches_any_text_field() {
        let mut a = post(1, None, 0, 0, 0);
        a.shop_name = "Old Wang BBQ".into();
        let mut b = post(2, None, 0, 0, 0);
        b.comment = "烤腰子很棒".into();
        let c = post(3, None, 0, 0, 0);

        let found = search_posts(vec![a.clone(), b.clone(), c.clone()], "wang");
        assert_eq!(found, vec![a.clone()]);
        let found = search_posts(vec![a.clone(), b.clone(), c.clone()], "腰子");
        assert_eq!(found, vec![b.clone()]);
        assert_eq!(search_posts(vec![a, b, c], "  ").len(), 3);
    }
}
