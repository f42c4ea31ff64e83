//! Review ratings and the per-course aggregate.

use serde::Serialize;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5")]
pub struct InvalidRating(pub i64);

/// Validate a rating and narrow it to its storage width.
pub fn validate_rating(rating: i64) -> Result<i16, InvalidRating> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating as i16)
    } else {
        Err(InvalidRating(rating))
    }
}

/// Derived rating fields stored on a course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingAggregate {
    pub average_rating: f64,
    pub number_of_reviews: i32,
}

impl RatingAggregate {
    pub const EMPTY: Self = Self {
        average_rating: 0.0,
        number_of_reviews: 0,
    };

    /// Mean and count of the given ratings; zero for an empty set.
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self::EMPTY;
        }
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        Self {
            average_rating: sum as f64 / ratings.len() as f64,
            number_of_reviews: ratings.len() as i32,
        }
    }
}
