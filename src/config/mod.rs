use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_request_size_bytes: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub uploads_dir: String,
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_force_update: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment-specific defaults first, then explicit env overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs =
                v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes =
                v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_TRUST_PROXY") {
            self.api.trust_proxy = v.parse().unwrap_or(self.api.trust_proxy);
        }
        if let Ok(v) = env::var("UPLOADS_DIR") {
            self.api.uploads_dir = v;
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.security.admin_email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.security.admin_password = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_FORCE_UPDATE") {
            self.security.admin_force_update = v.parse().unwrap_or(false);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 900,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                default_page_size: 20,
                max_page_size: 100,
                uploads_dir: "uploads".to_string(),
                trust_proxy: false,
            },
            security: SecurityConfig {
                // Development-only fallback; deployments must set JWT_SECRET
                jwt_secret: "folio-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                admin_email: None,
                admin_password: None,
                admin_force_update: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 300,
                rate_limit_window_secs: 900,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                default_page_size: 20,
                max_page_size: 100,
                uploads_dir: "uploads".to_string(),
                trust_proxy: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.example.com".to_string()],
                admin_email: None,
                admin_password: None,
                admin_force_update: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 5,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 900, // 15 minute fixed window
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                default_page_size: 20,
                max_page_size: 100,
                uploads_dir: "uploads".to_string(),
                trust_proxy: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec![],
                admin_email: None,
                admin_password: None,
                admin_force_update: false,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

// Resolved once at startup; handlers receive it by reference through AppState
// rather than reading process environment themselves.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
