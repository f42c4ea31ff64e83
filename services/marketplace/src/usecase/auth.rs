use anyhow::Context as _;
use chrono::Utc;
use uuid::Uuid;

use learnhub_auth_types::token::issue_session_token;

use crate::domain::repository::{MediaStoragePort, UserRepository};
use crate::domain::types::{
    DEFAULT_PROFILE_PICTURE, IMAGE_FOLDER, NewUser, ResourceType, StagedFile, User,
};
use crate::error::MarketplaceError;
use crate::usecase::{optional, required};

/// Authenticated user plus the session token to set as a cookie.
#[derive(Debug)]
pub struct SessionOutput {
    pub user: User,
    pub token: String,
}

pub fn session_token(user: &User, secret: &str) -> Result<String, MarketplaceError> {
    let (token, _exp) = issue_session_token(user.id, &user.name, user.role, secret)
        .context("sign session token")?;
    Ok(token)
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, MarketplaceError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("join password hashing task")?
        .context("hash password")?;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, MarketplaceError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("join password verification task")?
        .context("verify password")?;
    Ok(matches)
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<StagedFile>,
}

pub struct RegisterUseCase<R: UserRepository, M: MediaStoragePort> {
    pub users: R,
    pub media: M,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
}

impl<R: UserRepository, M: MediaStoragePort> RegisterUseCase<R, M> {
    pub async fn execute(&self, input: RegisterInput) -> Result<SessionOutput, MarketplaceError> {
        let name = required(input.name, "name")?;
        let email = required(input.email, "email")?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(MarketplaceError::MissingField("password"))?;

        // Checked again atomically on insert; this only avoids a wasted upload.
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(MarketplaceError::EmailTaken);
        }

        let profile_picture = match input.profile_picture {
            Some(file) => {
                self.media
                    .upload(&file, IMAGE_FOLDER, ResourceType::Auto)
                    .await?
            }
            None => DEFAULT_PROFILE_PICTURE.to_owned(),
        };

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = self
            .users
            .register(&NewUser {
                id: Uuid::now_v7(),
                name,
                email,
                password_hash,
                bio: optional(input.bio),
                profile_picture,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "registered user");
        let token = session_token(&user, &self.jwt_secret)?;
        Ok(SessionOutput { user, token })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub jwt_secret: String,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<SessionOutput, MarketplaceError> {
        let email = required(input.email, "email")?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(MarketplaceError::MissingField("password"))?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(MarketplaceError::InvalidCredentials)?;

        if !verify_password(password, user.password_hash.clone()).await? {
            return Err(MarketplaceError::InvalidCredentials);
        }

        let token = session_token(&user, &self.jwt_secret)?;
        Ok(SessionOutput { user, token })
    }
}
