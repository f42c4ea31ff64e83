use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_auth_types::cookie::{expire_session_cookie, set_session_cookie};
use learnhub_domain::user::UserRole;

use crate::domain::types::User;
use crate::error::MarketplaceError;
use crate::handlers::{ApiJson, ApiMultipart, MessageResponse};
use crate::handlers::upload::read_multipart;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};

/// Public part of the account carried by auth responses.
#[derive(Serialize)]
pub struct SessionUserResponse {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for SessionUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: SessionUserResponse,
}

// ── POST /auth/register ──────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, MarketplaceError> {
    let mut form = read_multipart(multipart, &state.upload_dir).await?;
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        media: state.media.clone(),
        jwt_secret: state.jwt_secret.clone(),
        bcrypt_cost: state.bcrypt_cost,
    };
    let out = usecase
        .execute(RegisterInput {
            name: form.text("name"),
            email: form.text("email"),
            password: form.text("password"),
            bio: form.text("bio"),
            profile_picture: form.file("profile_picture"),
        })
        .await?;

    let jar = set_session_cookie(jar, out.token, &state.cookie);
    let body = SessionResponse {
        user: SessionUserResponse::from(&out.user),
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token, &state.cookie);
    let body = SessionResponse {
        user: SessionUserResponse::from(&out.user),
    };
    Ok((jar, Json(body)))
}

// ── GET /auth/logout ─────────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = expire_session_cookie(jar, &state.cookie);
    (jar, MessageResponse::new("user logged out"))
}
