use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_auth_types::cookie::set_session_cookie;
use learnhub_auth_types::identity::Session;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::{ADMINS, UserRole};

use crate::domain::types::User;
use crate::error::MarketplaceError;
use crate::handlers::upload::read_multipart;
use crate::handlers::{ApiJson, ApiMultipart, ApiQuery, MessageResponse, path_id, require_role};
use crate::state::AppState;
use crate::usecase::auth::session_token;
use crate::usecase::user::{
    ChangeRoleUseCase, GetUserUseCase, ListUsersUseCase, UpdatePasswordInput,
    UpdatePasswordUseCase, UpdateProfileInput, UpdateProfileUseCase,
};

/// Account as exposed over HTTP. The password hash never leaves the service.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub profile_picture: String,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            bio: user.bio,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

// ── GET /users ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

pub async fn list_users(
    session: Session,
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<UserListResponse>, MarketplaceError> {
    require_role(&session, ADMINS)?;
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let users = usecase.execute(page).await?;
    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, MarketplaceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(path_id(&id)?).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

// ── PATCH /users/updateUser ──────────────────────────────────────────────────

pub async fn update_user(
    session: Session,
    State(state): State<AppState>,
    jar: CookieJar,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, MarketplaceError> {
    let mut form = read_multipart(multipart, &state.upload_dir).await?;
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
        media: state.media.clone(),
    };
    let user = usecase
        .execute(
            session.user_id,
            UpdateProfileInput {
                name: form.text("name"),
                email: form.text("email"),
                bio: form.text("bio"),
                profile_picture: form.file("profile_picture"),
            },
        )
        .await?;

    // The token carries the display name, so it is re-issued.
    let token = session_token(&user, &state.jwt_secret)?;
    let jar = set_session_cookie(jar, token, &state.cookie);
    Ok((jar, Json(UserEnvelope { user: user.into() })))
}

// ── PATCH /users/updateUserPassword ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn update_user_password(
    session: Session,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, MarketplaceError> {
    let usecase = UpdatePasswordUseCase {
        users: state.user_repo(),
        bcrypt_cost: state.bcrypt_cost,
    };
    usecase
        .execute(
            session.user_id,
            UpdatePasswordInput {
                old_password: body.old_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(MessageResponse::new("password updated"))
}

// ── PATCH /users/{id}/role ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    pub new_role: Option<String>,
}

pub async fn change_user_role(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ChangeRoleRequest>,
) -> Result<Json<UserEnvelope>, MarketplaceError> {
    require_role(&session, ADMINS)?;
    let usecase = ChangeRoleUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(path_id(&id)?, body.new_role).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}
