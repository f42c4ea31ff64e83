pub mod auth;
pub mod category;
pub mod course;
pub mod lecture;
pub mod order;
pub mod payment;
pub mod review;
pub mod section;
pub mod upload;
pub mod user;

use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use serde::Serialize;
use uuid::Uuid;

use learnhub_auth_types::identity::Session;
use learnhub_domain::user::UserRole;

use crate::error::MarketplaceError;

/// 403 unless the session holds one of `roles`.
pub(crate) fn require_role(session: &Session, roles: &[UserRole]) -> Result<(), MarketplaceError> {
    if session.has_any(roles) {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden)
    }
}

/// JSON body whose rejections answer with the service error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(MarketplaceError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections answer with the service error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(MarketplaceError))]
pub struct ApiQuery<T>(pub T);

/// Multipart body whose rejections answer with the service error body.
pub struct ApiMultipart(pub Multipart);

impl<S: Send + Sync> FromRequest<S> for ApiMultipart {
    type Rejection = MarketplaceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Multipart::from_request(req, state).await?))
    }
}

pub(crate) fn path_id(raw: &str) -> Result<Uuid, MarketplaceError> {
    raw.parse().map_err(|_| MarketplaceError::InvalidId("id"))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

impl MessageResponse {
    pub fn new(msg: &'static str) -> axum::Json<Self> {
        axum::Json(Self { msg })
    }
}
