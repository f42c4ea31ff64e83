use std::str::FromStr;

use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::review::validate_rating;

use crate::domain::repository::ReviewRepository;
use crate::domain::types::{CourseRating, Review, ReviewPatch};
use crate::error::MarketplaceError;
use crate::usecase::{optional, required_id};

/// Who may delete a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewDeletePolicy {
    /// Any authenticated user.
    #[default]
    Any,
    /// Only the review's author.
    Owner,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown review delete policy: {0}")]
pub struct UnknownPolicy(String);

impl FromStr for ReviewDeletePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "owner" => Ok(Self::Owner),
            other => Err(UnknownPolicy(other.to_owned())),
        }
    }
}

// ── CreateReview ─────────────────────────────────────────────────────────────

pub struct CreateReviewInput {
    pub course_id: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

pub struct CreateReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> CreateReviewUseCase<R> {
    pub async fn execute(
        &self,
        author_id: Uuid,
        input: CreateReviewInput,
    ) -> Result<(Review, CourseRating), MarketplaceError> {
        let course_id = required_id(input.course_id, "courseId")?;
        let rating = validate_rating(input.rating.ok_or(MarketplaceError::MissingField("rating"))?)?;

        let now = Utc::now();
        let review = Review {
            id: Uuid::now_v7(),
            user_id: author_id,
            course_id,
            rating,
            comment: optional(input.comment),
            created_at: now,
            updated_at: now,
        };
        let course = self.repo.create_rated(&review).await?;
        Ok((review, course))
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

pub struct UpdateReviewInput {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

pub struct UpdateReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> UpdateReviewUseCase<R> {
    pub async fn execute(
        &self,
        editor_id: Uuid,
        review_id: Uuid,
        input: UpdateReviewInput,
    ) -> Result<(Review, CourseRating), MarketplaceError> {
        let patch = ReviewPatch {
            rating: input.rating.map(validate_rating).transpose()?,
            comment: optional(input.comment),
        };

        let review = self
            .repo
            .find_by_id(review_id)
            .await?
            .ok_or(MarketplaceError::ReviewNotFound)?;
        if review.user_id != editor_id {
            return Err(MarketplaceError::NotReviewAuthor);
        }

        self.repo.update_rated(review_id, &patch).await
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<R: ReviewRepository> {
    pub repo: R,
    pub policy: ReviewDeletePolicy,
}

impl<R: ReviewRepository> DeleteReviewUseCase<R> {
    pub async fn execute(
        &self,
        requester_id: Uuid,
        review_id: Uuid,
    ) -> Result<CourseRating, MarketplaceError> {
        let review = self
            .repo
            .find_by_id(review_id)
            .await?
            .ok_or(MarketplaceError::ReviewNotFound)?;
        if self.policy == ReviewDeletePolicy::Owner && review.user_id != requester_id {
            return Err(MarketplaceError::NotReviewAuthor);
        }
        self.repo.delete_rated(review_id).await
    }
}
