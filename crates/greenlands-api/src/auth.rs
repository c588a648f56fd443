use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use uuid::Uuid;

use greenlands_db::Database;
use greenlands_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserProfile};
use greenlands_types::models::{Role, User};

use crate::blocking;
use crate::error::{ApiError, AuthFailure};
use crate::notify::NotificationSink;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub notifier: Arc<dyn NotificationSink>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".into()));
    }
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    // Role-specific required fields
    match req.role {
        Role::Farmer if req.farm_size.is_none() => {
            return Err(ApiError::Validation("Farm size is required for farmers".into()));
        }
        Role::Government if req.department.as_deref().unwrap_or("").trim().is_empty() => {
            return Err(ApiError::Validation(
                "Department is required for government users".into(),
            ));
        }
        _ => {}
    }

    let db = state.clone();
    let lookup = email.clone();
    if blocking(move || db.db.get_user_by_email(&lookup)).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        role: req.role,
        location: req.location,
        farm_size: req.farm_size,
        department: req.department,
        phone: req.phone,
        active: true,
        created_at: now,
        updated_at: now,
    };

    // Argon2 is deliberately slow; keep it off the async workers along with
    // the insert.
    let db = state.clone();
    let password = req.password;
    let user = blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();
        db.db.create_user(&user, &password_hash)?;
        Ok(user)
    })
    .await?;

    let token = create_token(&state.jwt_secret, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile::from(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    // None covers unknown email, wrong password and deactivated accounts
    // alike; the client sees one undifferentiated rejection.
    let db = state.clone();
    let password = req.password;
    let verified = blocking(move || {
        let Some(row) = db.db.get_user_by_email(&email)? else {
            return Ok(None);
        };
        let parsed_hash = PasswordHash::new(&row.password)
            .map_err(|e| anyhow::anyhow!("stored password hash unreadable: {}", e))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Ok(None);
        }
        let user = row.into_user()?;
        if !user.active {
            return Ok(None);
        }
        Ok(Some(user))
    })
    .await?;

    let user = verified.ok_or(AuthFailure::BadCredentials)?;
    let token = create_token(&state.jwt_secret, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        role: user.role,
        exp: (Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
