use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use geotrack::{
    AppState,
    cache::{KeyValueStore, LocationCache, MemoryStore, RedisStore},
    config::Config,
    location::{
        AlwaysGranted, FixedPositionProvider, GeocodeClient, LocationSession, PositionProvider,
        ReportedPositionProvider,
    },
    middleware::log_errors,
    routes,
    utils::{Clock, SystemClock},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 定位缓存存储：配置了 Redis 就用 Redis
    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            let redis_client =
                redis::Client::open(url.clone()).expect("Failed to create Redis client");
            Arc::new(RedisStore::new(Arc::new(redis_client)))
        }
        None => {
            tracing::info!("REDIS_URL not set, using in-memory location cache");
            Arc::new(MemoryStore::new())
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = LocationCache::new(store, clock.clone()).with_ttl(config.location_cache_ttl());

    let geocoder = GeocodeClient::new(
        &config.geocode_base_url,
        &config.geocode_key,
        config.geocode_timeout(),
    )
    .expect("Failed to build geocode client");

    // 开发环境可开启虚拟定位，否则使用小程序端上报的坐标
    let reporter = Arc::new(ReportedPositionProvider::new());
    let position: Arc<dyn PositionProvider> = if config.use_mock_location {
        let coordinate = config.mock_coordinate();
        tracing::info!(
            "Using mock location: {}, {}",
            coordinate.latitude(),
            coordinate.longitude()
        );
        Arc::new(FixedPositionProvider::new(coordinate))
    } else {
        reporter.clone()
    };

    let session = LocationSession::new(
        Arc::new(AlwaysGranted),
        position,
        Arc::new(geocoder),
        cache,
        clock,
    );

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        session: session.clone(),
        reporter,
    };

    // 预热：读取缓存或首次定位
    tokio::spawn(async move {
        session.initialize().await;
    });

    let app = routes::router(state.clone()).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(log_errors))
            .layer(cors_layer()),
    );

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}

// 开发模式放开 CORS
#[cfg(debug_assertions)]
fn cors_layer() -> CorsLayer {
    tracing::debug!("Adding permissive CORS layer for development mode");
    CorsLayer::permissive()
}

#[cfg(not(debug_assertions))]
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
}
