use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use messdesk_core::Error as CoreError;
use messdesk_core::storage::LocalFileStore;
use messdesk_db::Database;
use messdesk_types::api::{
    AuthResponse, AuthorityLoginRequest, Claims, HigherSignupRequest, MrSignupRequest,
    StudentLoginRequest, StudentSignupRequest,
};
use messdesk_types::models::{Mess, Role};

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub files: LocalFileStore,
    pub jwt_secret: String,
}

// -- Students --

pub async fn student_signup(
    State(state): State<AppState>,
    Json(req): Json<StudentSignupRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_signup(&req.name, &req.mobile, &req.password, &req.confirm_password, 6)?;
    if req.roll_no.trim().is_empty() {
        return Err(CoreError::validation("'roll_no' is required").into());
    }

    let resp = crate::blocking(move || {
        if state.db.get_student_by_roll(&req.roll_no)?.is_some() {
            return Err(CoreError::conflict("student roll number already exists"));
        }

        let hash = hash_password(&req.password)?;
        let id = Uuid::new_v4();
        state
            .db
            .create_student(
                &id.to_string(),
                &req.name,
                &req.roll_no,
                &req.mobile,
                &hash,
                req.mess.as_str(),
            )
            .map_err(|e| duplicate_on_conflict(e, "student roll number already exists"))?;

        let token = create_token(&state.jwt_secret, id, &req.name, Role::Student)?;
        Ok(AuthResponse { id, name: req.name, role: Role::Student, token })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn student_login(
    State(state): State<AppState>,
    Json(req): Json<StudentLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let resp = crate::blocking(move || {
        let student = state
            .db
            .get_student_by_roll(&req.roll_no)?
            .ok_or_else(invalid_credentials)?;

        verify_password(&req.password, &student.password)?;

        let id: Uuid = student
            .id
            .parse()
            .map_err(|_| CoreError::Internal(anyhow::anyhow!("corrupt student id")))?;
        let token = create_token(&state.jwt_secret, id, &student.name, Role::Student)?;
        Ok(AuthResponse { id, name: student.name, role: Role::Student, token })
    })
    .await
    .map_err(auth_failure)?;

    Ok(Json(resp))
}

// -- Mess representatives --

pub async fn mr_signup(
    State(state): State<AppState>,
    Json(req): Json<MrSignupRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_signup(&req.name, &req.mobile, &req.password, &req.confirm_password, 5)?;

    let resp = crate::blocking(move || {
        signup_authority(
            &state,
            &req.name,
            &req.email,
            &req.mobile,
            &req.password,
            "mr",
            Some(req.mess),
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn mr_login(
    State(state): State<AppState>,
    Json(req): Json<AuthorityLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    login_authority(state, req).await
}

// -- Higher authorities --

pub async fn higher_signup(
    State(state): State<AppState>,
    Json(req): Json<HigherSignupRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_signup(&req.name, &req.mobile, &req.password, &req.confirm_password, 5)?;

    let resp = crate::blocking(move || {
        signup_authority(&state, &req.name, &req.email, &req.mobile, &req.password, "higher", None)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn higher_login(
    State(state): State<AppState>,
    Json(req): Json<AuthorityLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    login_authority(state, req).await
}

/// Tokens are stateless; logout exists for client symmetry with the
/// signup/login endpoints.
pub async fn logout() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Logged out successfully" }))
}

// -- Shared helpers --

fn signup_authority(
    state: &AppStateInner,
    name: &str,
    email: &str,
    mobile: &str,
    password: &str,
    role: &str,
    mess: Option<Mess>,
) -> messdesk_core::Result<AuthResponse> {
    if !email.contains('@') {
        return Err(CoreError::validation("a valid email is required"));
    }
    if state.db.get_authority_by_email(email)?.is_some() {
        return Err(CoreError::conflict("email already registered"));
    }

    let hash = hash_password(password)?;
    let id = Uuid::new_v4();
    state
        .db
        .create_authority(
            &id.to_string(),
            name,
            role,
            mess.map(|m| m.as_str()),
            mobile,
            email,
            &hash,
        )
        .map_err(|e| duplicate_on_conflict(e, "email already registered"))?;

    let role = match mess {
        Some(mess) => Role::Mr { mess },
        None => Role::Higher,
    };
    let token = create_token(&state.jwt_secret, id, name, role.clone())?;
    Ok(AuthResponse { id, name: name.to_string(), role, token })
}

async fn login_authority(
    state: AppState,
    req: AuthorityLoginRequest,
) -> ApiResult<impl IntoResponse> {
    let resp = crate::blocking(move || {
        let authority = state
            .db
            .get_authority_by_email(&req.email)?
            .ok_or_else(invalid_credentials)?;

        verify_password(&req.password, &authority.password)?;

        let id: Uuid = authority
            .id
            .parse()
            .map_err(|_| CoreError::Internal(anyhow::anyhow!("corrupt authority id")))?;
        let role = match authority.role.as_str() {
            "mr" => {
                let mess = authority
                    .mess
                    .as_deref()
                    .and_then(|m| m.parse::<Mess>().ok())
                    .ok_or_else(|| {
                        CoreError::Internal(anyhow::anyhow!("mr record missing mess scope"))
                    })?;
                Role::Mr { mess }
            }
            "higher" => Role::Higher,
            other => {
                return Err(CoreError::Internal(anyhow::anyhow!(
                    "unknown authority role '{other}'"
                )));
            }
        };

        let token = create_token(&state.jwt_secret, id, &authority.name, role.clone())?;
        Ok(AuthResponse { id, name: authority.name, role, token })
    })
    .await
    .map_err(auth_failure)?;

    Ok(Json(resp))
}

fn validate_signup(
    name: &str,
    mobile: &str,
    password: &str,
    confirm_password: &str,
    min_password: usize,
) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("'name' is required").into());
    }
    if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::validation("mobile number must be 10 digits").into());
    }
    if password.chars().count() < min_password {
        return Err(CoreError::validation(format!(
            "password must be at least {min_password} characters long"
        ))
        .into());
    }
    if password != confirm_password {
        return Err(CoreError::validation("passwords don't match").into());
    }
    Ok(())
}

fn hash_password(password: &str) -> messdesk_core::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> messdesk_core::Result<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::Internal(anyhow::anyhow!("corrupt password hash: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| invalid_credentials())
}

fn create_token(
    secret: &str,
    id: Uuid,
    name: &str,
    role: Role,
) -> messdesk_core::Result<String> {
    let claims = Claims {
        sub: id,
        name: name.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| CoreError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
}

/// The existence pre-checks above run outside any transaction, so two
/// concurrent signups for the same roll number or email can both pass them
/// and race to the INSERT. The loser hits the UNIQUE index; answer that as
/// the same duplicate-record conflict the pre-check reports.
fn duplicate_on_conflict(e: anyhow::Error, message: &str) -> CoreError {
    if messdesk_db::is_constraint_violation(&e) {
        CoreError::conflict(message)
    } else {
        CoreError::Internal(e)
    }
}

/// Placeholder core error for bad credentials; remapped to 401 before it
/// leaves the handler so it never reads as an ownership failure.
fn invalid_credentials() -> CoreError {
    CoreError::forbidden("invalid credentials")
}

fn auth_failure(e: ApiError) -> ApiError {
    match e {
        ApiError::Core(CoreError::Authorization(m)) => ApiError::Unauthorized(m),
        other => other,
    }
}
