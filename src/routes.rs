use axum::{
    extract::{DefaultBodyLimit, Extension, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{auth as auth_handlers, contact, messages, resources};
use crate::middleware::{authenticate_token, optional_auth, rate_limit_middleware, require_admin};
use crate::resource::{catalog, ResourceDescriptor, ToggleTarget};
use crate::AppState;

/// Compose the full application: public surface, per-resource routers from
/// the catalog, custom message/contact routers, and the global layers.
pub fn app(state: AppState) -> Router {
    let mut api = Router::new().merge(auth_routes(&state));
    for &desc in catalog::GENERIC_RESOURCES {
        api = api.nest(&format!("/{}", desc.name), resource_routes(desc, &state));
    }
    let api = api
        .nest("/messages", message_routes(&state))
        .nest("/contact", contact_routes(&state))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&state.config.api.uploads_dir))
        .fallback(fallback)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One resource's route set, generated from its descriptor. Reads mount with
/// optional auth (admins see inactive records); writes require the admin
/// role behind token authentication.
fn resource_routes(desc: &'static ResourceDescriptor, state: &AppState) -> Router<AppState> {
    let mut public = Router::new()
        .route("/", get(resources::list))
        .route("/:id", get(resources::get_one));
    if desc.features.category_routes {
        public = public
            .route("/featured", get(resources::featured))
            .route("/category/:category", get(resources::by_category));
    }
    if desc.features.like_counter {
        public = public.route("/:id/like", post(resources::like));
    }
    let public = public.route_layer(from_fn_with_state(state.clone(), optional_auth));

    let mut admin = Router::new()
        .route("/", post(resources::create))
        .route("/:id", put(resources::update).delete(resources::remove));
    if desc.features.reorder {
        admin = admin.route("/:id/order", put(resources::set_order));
    }
    match desc.features.toggle {
        Some(ToggleTarget::ActiveFlag) => {
            admin = admin.route("/:id/toggle", put(resources::toggle));
        }
        Some(ToggleTarget::DocFlag(_)) => {
            admin = admin.route("/:id/featured", put(resources::toggle));
        }
        None => {}
    }
    let admin = admin
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate_token));

    public.merge(admin).layer(Extension(desc))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(auth_handlers::me))
        .route_layer(from_fn_with_state(state.clone(), authenticate_token));

    Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .merge(protected)
}

fn message_routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(messages::list))
        .route("/:id", get(messages::get_one).delete(messages::remove))
        .route("/:id/status", put(messages::update_status))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate_token));

    Router::new()
        .route("/", post(messages::create))
        .merge(admin)
}

fn contact_routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", put(contact::update_contact))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate_token));

    Router::new()
        .route("/", get(contact::get_contact))
        .route("/download", post(contact::count_download))
        .merge(admin)
}

/// Exact-match allow-list from config; localhost callers are additionally
/// admitted outside production.
fn cors_layer(config: &'static AppConfig) -> CorsLayer {
    let allow_origin = if config.is_production() {
        let origins: Vec<HeaderValue> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    } else {
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|origin| {
                    config.security.cors_origins.iter().any(|allowed| allowed == origin)
                        || origin.starts_with("http://localhost")
                        || origin.starts_with("http://127.0.0.1")
                })
                .unwrap_or(false)
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Folio API",
            "version": version,
            "description": "Portfolio content backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/login (public), /api/auth/me (protected)",
                "content": "/api/{skills,projects,education,experience,certifications,technologies,social} (reads public, writes admin)",
                "messages": "/api/messages (create public, inbox admin)",
                "contact": "/api/contact (read public, update admin)",
                "uploads": "/uploads/* (static)",
            }
        }
    }))
}

/// Unauthenticated liveness endpoint: uptime, timestamp, datastore ping.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let uptime_secs = state.started_at.elapsed().as_secs();

    match crate::store::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "uptimeSecs": uptime_secs,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "message": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "uptimeSecs": uptime_secs,
                    "databaseError": e.to_string()
                }
            })),
        ),
    }
}

/// Catch-all 404 in the uniform envelope
async fn fallback() -> crate::error::ApiError {
    crate::error::ApiError::not_found("Route not found")
}
