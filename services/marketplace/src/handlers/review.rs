use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_auth_types::identity::Session;

use crate::domain::types::{CourseRating, Review};
use crate::error::MarketplaceError;
use crate::handlers::{ApiJson, path_id};
use crate::state::AppState;
use crate::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, UpdateReviewInput,
    UpdateReviewUseCase,
};

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            course_id: review.course_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// Course rating fields after the write.
#[derive(Serialize)]
pub struct CourseRatingResponse {
    pub id: Uuid,
    pub average_rating: f64,
    pub number_of_reviews: i32,
}

impl From<CourseRating> for CourseRatingResponse {
    fn from(rating: CourseRating) -> Self {
        Self {
            id: rating.course_id,
            average_rating: rating.average_rating,
            number_of_reviews: rating.number_of_reviews,
        }
    }
}

// ── POST /reviews ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub course_id: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct CreateReviewResponse {
    pub review: ReviewResponse,
    pub course: CourseRatingResponse,
}

pub async fn create_review(
    session: Session,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<CreateReviewResponse>), MarketplaceError> {
    let usecase = CreateReviewUseCase {
        repo: state.review_repo(),
    };
    let (review, course) = usecase
        .execute(
            session.user_id,
            CreateReviewInput {
                course_id: body.course_id,
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateReviewResponse {
            review: review.into(),
            course: course.into(),
        }),
    ))
}

// ── PATCH /reviews/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateReviewResponse {
    pub msg: &'static str,
    pub review: ReviewResponse,
}

pub async fn update_review(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateReviewRequest>,
) -> Result<Json<UpdateReviewResponse>, MarketplaceError> {
    let usecase = UpdateReviewUseCase {
        repo: state.review_repo(),
    };
    let (review, _) = usecase
        .execute(
            session.user_id,
            path_id(&id)?,
            UpdateReviewInput {
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok(Json(UpdateReviewResponse {
        msg: "review updated",
        review: review.into(),
    }))
}

// ── DELETE /reviews/{id} ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteReviewResponse {
    pub msg: &'static str,
    pub course: CourseRatingResponse,
}

pub async fn delete_review(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteReviewResponse>, MarketplaceError> {
    let usecase = DeleteReviewUseCase {
        repo: state.review_repo(),
        policy: state.review_delete_policy,
    };
    let course = usecase.execute(session.user_id, path_id(&id)?).await?;
    Ok(Json(DeleteReviewResponse {
        msg: "review deleted",
        course: course.into(),
    }))
}
