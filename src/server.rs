use crate::config::Config;
use crate::error::WisdomError;
use crate::handlers::{
    api_info, health_check, landing_page, list_authors, list_categories, list_sources,
    list_wisdom, random_wisdom, search_wisdom, wisdom_by_id, AppState, SharedState,
};
use crate::middleware::{logging_middleware, rate_limit_middleware};
use crate::rate_limit_config::RateLimitConfig;
use crate::rate_limiter::RateLimiter;
use crate::store::RecordStore;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the router over an already constructed application state.
pub fn create_app(state: SharedState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/info", get(api_info))
        .route("/wisdom", get(list_wisdom))
        .route("/wisdom/random", get(random_wisdom))
        .route("/wisdom/search", get(search_wisdom))
        .route("/wisdom/categories", get(list_categories))
        .route("/wisdom/authors", get(list_authors))
        .route("/wisdom/sources", get(list_sources))
        .route("/wisdom/:id", get(wisdom_by_id))
        .route("/health", get(health_check))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    app: Router,
    state: SharedState,
    bind_address: SocketAddr,
    cleanup_interval: Duration,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, WisdomError> {
        let store = RecordStore::load(&config.data_file)?;

        let limits = if config.rate_limit_enabled {
            RateLimitConfig::default()
        } else {
            tracing::warn!("Rate limiting is disabled");
            RateLimitConfig::disabled()
        };

        let state = AppState::new(store, RateLimiter::new(limits));
        let app = create_app(state.clone());

        Ok(Self {
            app,
            state,
            bind_address: config.bind_address,
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs.max(1)),
        })
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;

        tracing::info!("Wisdom API listening on {}", self.bind_address);
        tracing::info!("Serving {} pieces of wisdom", self.state.store.count());

        let sweeper = tokio::spawn(sweep_expired_windows(
            self.state.rate_limiter.clone(),
            self.cleanup_interval,
        ));

        // Client addresses are the rate limit keys
        axum::serve(
            listener,
            self.app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        sweeper.abort();
        Ok(())
    }
}

async fn sweep_expired_windows(rate_limiter: RateLimiter, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match rate_limiter.cleanup_expired_windows() {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "Removed expired rate limit windows"),
            Err(e) => tracing::error!("Rate limit window cleanup failed: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
