use std::path::PathBuf;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use learnhub_auth_types::cookie::CookieSettings;
use learnhub_auth_types::identity::SessionKey;

use crate::config::MarketplaceConfig;
use crate::infra::cloudinary::CloudinaryClient;
use crate::infra::db::{
    DbCategoryRepository, DbCourseRepository, DbLectureRepository, DbOrderRepository,
    DbReviewRepository, DbSectionRepository, DbUserRepository,
};
use crate::infra::stripe::StripeClient;
use crate::usecase::review::ReviewDeletePolicy;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub cookie: CookieSettings,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub payments: StripeClient,
    pub webhook_secret: Option<String>,
    pub media: CloudinaryClient,
    pub success_url: String,
    pub public_base_url: String,
    pub review_delete_policy: ReviewDeletePolicy,
}

impl AppState {
    pub fn new(config: MarketplaceConfig, db: DatabaseConnection, http: reqwest::Client) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret,
            cookie: CookieSettings {
                domain: config.cookie_domain,
                secure: config.cookie_secure,
            },
            bcrypt_cost: config.bcrypt_cost,
            upload_dir: config.upload_dir,
            max_upload_bytes: config.max_upload_bytes,
            payments: StripeClient {
                http: http.clone(),
                secret_key: config.stripe_secret_key,
                api_base: config.stripe_api_base,
            },
            webhook_secret: config.stripe_webhook_secret,
            media: CloudinaryClient {
                http,
                cloud_name: config.cloudinary_cloud_name,
                api_key: config.cloudinary_api_key,
                api_secret: config.cloudinary_api_secret,
                api_base: config.cloudinary_api_base,
            },
            success_url: config.frontend_success_url,
            public_base_url: config.public_base_url,
            review_delete_policy: config.review_delete_policy,
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn section_repo(&self) -> DbSectionRepository {
        DbSectionRepository {
            db: self.db.clone(),
        }
    }

    pub fn lecture_repo(&self) -> DbLectureRepository {
        DbLectureRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        SessionKey(state.jwt_secret.clone())
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
