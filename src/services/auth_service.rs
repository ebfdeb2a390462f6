use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::MongoDB;
use crate::models::UserInDb;
use crate::services::user_service;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // username
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    #[serde(rename = "type")]
    pub token_type: String,    // "access" or "refresh"
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

// Hash a password with bcrypt
pub fn hash_password(password: &str) -> Result<String, String> {
    hash(password, DEFAULT_COST).map_err(|e| format!("Failed to hash password: {}", e))
}

// Verify a password against a bcrypt hash
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, String> {
    verify(plain, hashed).map_err(|e| format!("Password verification error: {}", e))
}

// Generate short-lived access token
pub fn generate_access_token(username: &str, config: &Config) -> Result<String, String> {
    generate_token(
        username,
        TOKEN_TYPE_ACCESS,
        Duration::minutes(config.access_token_expire_minutes),
        &config.secret_key,
    )
}

// Generate refresh token (longer expiry)
pub fn generate_refresh_token(username: &str, config: &Config) -> Result<String, String> {
    generate_token(
        username,
        TOKEN_TYPE_REFRESH,
        Duration::days(config.refresh_token_expire_days),
        &config.secret_key,
    )
}

fn generate_token(
    username: &str,
    token_type: &str,
    expires_in: Duration,
    secret: &str,
) -> Result<String, String> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + expires_in).timestamp() as usize;

    let claims = Claims {
        sub: username.to_string(),
        iat,
        exp,
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

// Verify an access token and return its claims
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode_token(token, secret)?;
    if claims.token_type != TOKEN_TYPE_ACCESS {
        return Err("Not an access token".to_string());
    }
    Ok(claims)
}

// Verify a refresh token and return its claims
pub fn verify_refresh_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode_token(token, secret)?;
    if claims.token_type != TOKEN_TYPE_REFRESH {
        return Err("Not a refresh token".to_string());
    }
    Ok(claims)
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

// Look the user up and check the password
pub async fn authenticate_user(
    db: &MongoDB,
    username: &str,
    password: &str,
) -> Result<UserInDb, String> {
    let user = user_service::find_user_by_username(db, username)
        .await?
        .ok_or_else(|| "Invalid credentials".to_string())?;

    let valid = verify_password(password, &user.hashed_password)?;
    if !valid {
        return Err("Invalid credentials".to_string());
    }

    Ok(user)
}

// User login
pub async fn login(
    db: &MongoDB,
    config: &Config,
    request: &LoginRequest,
) -> Result<TokenResponse, String> {
    let user = authenticate_user(db, &request.username, &request.password).await?;

    Ok(TokenResponse {
        access_token: generate_access_token(&user.username, config)?,
        refresh_token: generate_refresh_token(&user.username, config)?,
        token_type: "bearer".to_string(),
    })
}

// Exchange a refresh token for a fresh pair
pub async fn refresh_token(
    db: &MongoDB,
    config: &Config,
    request: &RefreshTokenRequest,
) -> Result<TokenResponse, String> {
    let claims = verify_refresh_token(&request.refresh_token, &config.secret_key)?;

    // The account may have been deleted since the token was issued
    let user = user_service::find_user_by_username(db, &claims.sub)
        .await?
        .ok_or_else(|| "User not found".to_string())?;

    Ok(TokenResponse {
        access_token: generate_access_token(&user.username, config)?,
        refresh_token: generate_refresh_token(&user.username, config)?,
        token_type: "bearer".to_string(),
    })
}
