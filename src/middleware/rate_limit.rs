//! Fixed-window per-IP rate limiting for the `/api` surface.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::AppState;

struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    windows: RwLock<HashMap<IpAddr, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Count one request against the caller's current window. Returns false
    /// once the window's budget is spent.
    pub async fn try_acquire(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        // Opportunistic cleanup keeps the map bounded on long uptimes
        if windows.len() > 10_000 {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(ip).or_insert(Window { started: now, count: 0 });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            false
        } else {
            entry.count += 1;
            true
        }
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.api.enable_rate_limiting {
        return Ok(next.run(request).await);
    }

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(request.headers(), remote, state.config.api.trust_proxy)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    if state.limiter.try_acquire(ip).await {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::too_many_requests(
            "Too many requests, please try again later",
        ))
    }
}

/// Resolve the caller's address. `X-Forwarded-For` is honored only behind a
/// trusted reverse proxy; otherwise the socket address wins.
pub fn client_ip(
    headers: &HeaderMap,
    remote: Option<SocketAddr>,
    trust_proxy: bool,
) -> Option<IpAddr> {
    if trust_proxy {
        if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            if let Some(first) = forwarded.split(',').next() {
                if let Ok(ip) = first.trim().parse() {
                    return Some(ip);
                }
            }
        }
    }
    remote.map(|addr| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn budget_is_enforced_within_one_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.try_acquire(ip).await);
        assert!(limiter.try_acquire(ip).await);
        assert!(limiter.try_acquire(ip).await);
        assert!(!limiter.try_acquire(ip).await);

        // A different caller has its own window
        let other: IpAddr = "10.0.0.2".parse().unwrap();
        assert!(limiter.try_acquire(other).await);
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        let ip: IpAddr = "10.0.0.3".parse().unwrap();

        assert!(limiter.try_acquire(ip).await);
        assert!(!limiter.try_acquire(ip).await);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.try_acquire(ip).await);
    }

    #[test]
    fn forwarded_header_is_only_trusted_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let remote: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        let trusted = client_ip(&headers, Some(remote), true).unwrap();
        assert_eq!(trusted.to_string(), "203.0.113.9");

        let untrusted = client_ip(&headers, Some(remote), false).unwrap();
        assert_eq!(untrusted.to_string(), "127.0.0.1");

        assert!(client_ip(&HeaderMap::new(), None, true).is_none());
    }
}
