use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use learnhub_domain::course::PriceError;
use learnhub_domain::review::InvalidRating;

/// Marketplace service error variants.
///
/// Every variant maps onto one HTTP class: 400 bad request, 401
/// unauthenticated, 403 unauthorized, 404 not found or 500 internal.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    // 400
    #[error("please provide {0}")]
    MissingField(&'static str),
    #[error("nothing to update")]
    NothingToUpdate,
    #[error("invalid {0}")]
    InvalidId(&'static str),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    InvalidPrice(#[from] PriceError),
    #[error(transparent)]
    InvalidRating(#[from] InvalidRating),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("email already exists")]
    EmailTaken,
    #[error("category already exists")]
    CategoryNameTaken,
    #[error("category still has courses")]
    CategoryInUse,
    #[error("you already have this course")]
    CourseAlreadyOwned,
    #[error("you already reviewed this course")]
    ReviewAlreadyExists,
    #[error("old password is incorrect")]
    WrongPassword,
    #[error("invalid webhook signature")]
    InvalidSignature,
    // 401
    #[error("invalid credentials")]
    InvalidCredentials,
    // 403
    #[error("not authorized to access this route")]
    Forbidden,
    #[error("only the course instructor can modify this course")]
    NotCourseOwner,
    #[error("only the review author can modify this review")]
    NotReviewAuthor,
    // 404
    #[error("user not found")]
    UserNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("section not found")]
    SectionNotFound,
    #[error("lecture not found")]
    LectureNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("review not found")]
    ReviewNotFound,
    // 500
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::NothingToUpdate => "NOTHING_TO_UPDATE",
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidPrice(_) => "INVALID_PRICE",
            Self::InvalidRating(_) => "INVALID_RATING",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::CategoryNameTaken => "CATEGORY_NAME_TAKEN",
            Self::CategoryInUse => "CATEGORY_IN_USE",
            Self::CourseAlreadyOwned => "COURSE_ALREADY_OWNED",
            Self::ReviewAlreadyExists => "REVIEW_ALREADY_EXISTS",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::NotCourseOwner => "NOT_COURSE_OWNER",
            Self::NotReviewAuthor => "NOT_REVIEW_AUTHOR",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::SectionNotFound => "SECTION_NOT_FOUND",
            Self::LectureNotFound => "LECTURE_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ReviewNotFound => "REVIEW_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::NothingToUpdate
            | Self::InvalidId(_)
            | Self::InvalidBody(_)
            | Self::InvalidPrice(_)
            | Self::InvalidRating(_)
            | Self::InvalidRole(_)
            | Self::EmailTaken
            | Self::CategoryNameTaken
            | Self::CategoryInUse
            | Self::CourseAlreadyOwned
            | Self::ReviewAlreadyExists
            | Self::WrongPassword
            | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotCourseOwner | Self::NotReviewAuthor => {
                StatusCode::FORBIDDEN
            }
            Self::UserNotFound
            | Self::CategoryNotFound
            | Self::CourseNotFound
            | Self::SectionNotFound
            | Self::LectureNotFound
            | Self::OrderNotFound
            | Self::ReviewNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for MarketplaceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for MarketplaceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<MultipartRejection> for MarketplaceError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "msg": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
