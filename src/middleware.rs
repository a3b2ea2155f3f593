use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::error::WisdomError;
use crate::handlers::SharedState;
use crate::rate_limit_config::EndpointClass;

/// Logging middleware for request/response tracking
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = client_key(&request);

    info!(
        target: "wisdom_api::middleware",
        method = %method,
        uri = %uri,
        client_ip = %client_ip,
        "Incoming request"
    );

    let response = next.run(request).await;

    let status = response.status();
    info!(
        target: "wisdom_api::middleware",
        method = %method,
        uri = %uri,
        status = %status,
        "Request completed"
    );

    response
}

/// Admit or reject the request before the handler runs. Each route has its own
/// window per client; the limit is taken from the route's endpoint class.
pub async fn rate_limit_middleware(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let matched = request.extensions().get::<MatchedPath>().and_then(|path| {
        EndpointClass::for_route(path.as_str()).map(|class| (path.as_str().to_string(), class))
    });

    let Some((route, class)) = matched else {
        return next.run(request).await;
    };

    let client = client_key(&request);
    match state.rate_limiter.check(&client, &route, class) {
        Ok(status) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", HeaderValue::from(status.limit));
            headers.insert("X-RateLimit-Remaining", HeaderValue::from(status.remaining));
            response
        }
        Err(err @ WisdomError::RateLimited { .. }) => {
            warn!(
                target: "wisdom_api::middleware",
                client_ip = %client,
                route = %route,
                endpoint_class = %class,
                "Rate limit exceeded"
            );
            err.into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Rate limit key for the caller: the peer IP address. Forwarding headers are not trusted.
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
