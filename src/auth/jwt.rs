use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Access tokens are issued by the auth service; this is used by tooling and tests.
pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate an access token. Refresh tokens are rejected.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Access token required".to_string());
    }
    Ok(claims)
}
