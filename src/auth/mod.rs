use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Bearer-token claims carried by every admin session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: String, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            role,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Validate a bearer token and return its claims. The error string is
/// client-safe; token internals are never echoed back.
pub fn verify_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, String> {
    if security.jwt_secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|_| "Invalid or expired token".to_string())?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("password hashing failed: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "unit-test-secret".to_string(),
            jwt_expiry_hours: 1,
            cors_origins: vec![],
            admin_email: None,
            admin_password: None,
            admin_force_update: false,
        }
    }

    #[test]
    fn jwt_round_trip_preserves_claims() {
        let security = test_security();
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "admin".to_string(), &security);

        let token = generate_jwt(&claims, &security).unwrap();
        let decoded = verify_jwt(&token, &security).unwrap();

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.role, "admin");
        assert!(decoded.is_admin());
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let security = test_security();
        let claims = Claims::new(Uuid::new_v4(), "admin".to_string(), &security);
        let token = generate_jwt(&claims, &security).unwrap();

        let mut other = test_security();
        other.jwt_secret = "a-different-secret".to_string();
        assert!(verify_jwt(&token, &other).is_err());
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut security = test_security();
        security.jwt_secret.clear();
        let claims = Claims::new(Uuid::new_v4(), "admin".to_string(), &security);
        assert!(matches!(
            generate_jwt(&claims, &security),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("hunter2hunter2", "not-a-phc-string"));
    }
}
