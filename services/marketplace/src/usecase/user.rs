use uuid::Uuid;

use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::UserRole;

use crate::domain::repository::{MediaStoragePort, UserRepository};
use crate::domain::types::{IMAGE_FOLDER, ResourceType, StagedFile, User, UserPatch};
use crate::error::MarketplaceError;
use crate::usecase::auth::{hash_password, verify_password};
use crate::usecase::{optional, required};

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<User>, MarketplaceError> {
        self.repo.list(page.clamped()).await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, MarketplaceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<StagedFile>,
}

pub struct UpdateProfileUseCase<R: UserRepository, M: MediaStoragePort> {
    pub users: R,
    pub media: M,
}

impl<R: UserRepository, M: MediaStoragePort> UpdateProfileUseCase<R, M> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<User, MarketplaceError> {
        let mut patch = UserPatch {
            name: optional(input.name),
            email: optional(input.email),
            bio: optional(input.bio),
            profile_picture: None,
        };
        if patch.is_empty() && input.profile_picture.is_none() {
            return Err(MarketplaceError::NothingToUpdate);
        }

        if let Some(ref email) = patch.email {
            if let Some(owner) = self.users.find_by_email(email).await? {
                if owner.id != user_id {
                    return Err(MarketplaceError::EmailTaken);
                }
            }
        }

        if let Some(file) = input.profile_picture {
            let url = self
                .media
                .upload(&file, IMAGE_FOLDER, ResourceType::Auto)
                .await?;
            patch.profile_picture = Some(url);
        }

        self.users.update_profile(user_id, &patch).await
    }
}

// ── UpdatePassword ───────────────────────────────────────────────────────────

pub struct UpdatePasswordInput {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct UpdatePasswordUseCase<R: UserRepository> {
    pub users: R,
    pub bcrypt_cost: u32,
}

impl<R: UserRepository> UpdatePasswordUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdatePasswordInput,
    ) -> Result<(), MarketplaceError> {
        let old_password = input
            .old_password
            .filter(|p| !p.is_empty())
            .ok_or(MarketplaceError::MissingField("oldPassword"))?;
        let new_password = input
            .new_password
            .filter(|p| !p.is_empty())
            .ok_or(MarketplaceError::MissingField("newPassword"))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        if !verify_password(old_password, user.password_hash).await? {
            return Err(MarketplaceError::WrongPassword);
        }

        let hash = hash_password(new_password, self.bcrypt_cost).await?;
        self.users.update_password(user_id, &hash).await
    }
}

// ── ChangeRole ───────────────────────────────────────────────────────────────

pub struct ChangeRoleUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ChangeRoleUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        new_role: Option<String>,
    ) -> Result<User, MarketplaceError> {
        let raw = required(new_role, "newRole")?;
        let role: UserRole = raw
            .parse()
            .map_err(|_| MarketplaceError::InvalidRole(raw.clone()))?;
        let user = self
            .users
            .update_role(user_id, role)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;
        tracing::info!(user_id = %user.id, role = %role, "changed user role");
        Ok(user)
    }
}
