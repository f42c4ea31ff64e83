use rust_decimal::Decimal;
use uuid::Uuid;

use learnhub_marketplace::domain::types::Course;
use learnhub_marketplace::error::MarketplaceError;
use learnhub_marketplace::usecase::review::{
    CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase, ReviewDeletePolicy,
    UpdateReviewInput, UpdateReviewUseCase,
};

use crate::helpers::{MockReviewRepo, test_course};

fn rated_course() -> Course {
    test_course(Uuid::now_v7(), Uuid::now_v7(), Decimal::new(25, 0))
}

fn review_input(course_id: Uuid, rating: i64) -> CreateReviewInput {
    CreateReviewInput {
        course_id: Some(course_id.to_string()),
        rating: Some(rating),
        comment: Some("Clear and well paced".into()),
    }
}

#[tokio::test]
async fn should_update_course_aggregate_on_create() {
    let course = rated_course();
    let repo = MockReviewRepo::new(vec![course.clone()]);
    let uc = CreateReviewUseCase { repo: repo.clone() };

    uc.execute(Uuid::now_v7(), review_input(course.id, 4)).await.unwrap();
    let (review, rating) = uc.execute(Uuid::now_v7(), review_input(course.id, 5)).await.unwrap();

    assert_eq!(review.rating, 5);
    assert_eq!(rating.course_id, course.id);
    assert_eq!(rating.number_of_reviews, 2);
    assert!((rating.average_rating - 4.5).abs() < f64::EPSILON);

    let stored = repo.course(course.id).unwrap();
    assert_eq!(stored.number_of_reviews, 2);
    assert!((stored.average_rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_reject_second_review_from_same_user() {
    let course = rated_course();
    let uc = CreateReviewUseCase {
        repo: MockReviewRepo::new(vec![course.clone()]),
    };
    let author = Uuid::now_v7();
    uc.execute(author, review_input(course.id, 3)).await.unwrap();

    let result = uc.execute(author, review_input(course.id, 5)).await;

    assert!(
        matches!(result, Err(MarketplaceError::ReviewAlreadyExists)),
        "expected ReviewAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_out_of_range_rating() {
    let course = rated_course();
    let uc = CreateReviewUseCase {
        repo: MockReviewRepo::new(vec![course.clone()]),
    };

    for rating in [0, 6] {
        let result = uc.execute(Uuid::now_v7(), review_input(course.id, rating)).await;
        assert!(
            matches!(result, Err(MarketplaceError::InvalidRating(_))),
            "expected InvalidRating for {rating}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_review_for_unknown_course() {
    let uc = CreateReviewUseCase {
        repo: MockReviewRepo::new(vec![]),
    };

    let result = uc.execute(Uuid::now_v7(), review_input(Uuid::now_v7(), 4)).await;

    assert!(matches!(result, Err(MarketplaceError::CourseNotFound)));
}

#[tokio::test]
async fn should_recompute_aggregate_on_update() {
    let course = rated_course();
    let repo = MockReviewRepo::new(vec![course.clone()]);
    let author = Uuid::now_v7();
    let (review, _) = CreateReviewUseCase { repo: repo.clone() }
        .execute(author, review_input(course.id, 2))
        .await
        .unwrap();

    let (updated, rating) = UpdateReviewUseCase { repo: repo.clone() }
        .execute(
            author,
            review.id,
            UpdateReviewInput {
                rating: Some(5),
                comment: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.rating, 5);
    assert_eq!(updated.comment, review.comment);
    assert_eq!(rating.number_of_reviews, 1);
    assert!((rating.average_rating - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_reject_update_from_non_author() {
    let course = rated_course();
    let repo = MockReviewRepo::new(vec![course.clone()]);
    let (review, _) = CreateReviewUseCase { repo: repo.clone() }
        .execute(Uuid::now_v7(), review_input(course.id, 4))
        .await
        .unwrap();

    let result = UpdateReviewUseCase { repo }
        .execute(
            Uuid::now_v7(),
            review.id,
            UpdateReviewInput {
                rating: Some(1),
                comment: None,
            },
        )
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::NotReviewAuthor)),
        "expected NotReviewAuthor, got {result:?}"
    );
}

#[tokio::test]
async fn should_reset_aggregate_when_last_review_deleted() {
    let course = rated_course();
    let repo = MockReviewRepo::new(vec![course.clone()]);
    let (review, _) = CreateReviewUseCase { repo: repo.clone() }
        .execute(Uuid::now_v7(), review_input(course.id, 4))
        .await
        .unwrap();

    let rating = DeleteReviewUseCase {
        repo: repo.clone(),
        policy: ReviewDeletePolicy::Any,
    }
    .execute(Uuid::now_v7(), review.id)
    .await
    .unwrap();

    assert_eq!(rating.number_of_reviews, 0);
    assert_eq!(rating.average_rating, 0.0);
    assert!(repo.reviews.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_enforce_owner_delete_policy() {
    let course = rated_course();
    let repo = MockReviewRepo::new(vec![course.clone()]);
    let author = Uuid::now_v7();
    let (review, _) = CreateReviewUseCase { repo: repo.clone() }
        .execute(author, review_input(course.id, 4))
        .await
        .unwrap();
    let uc = DeleteReviewUseCase {
        repo: repo.clone(),
        policy: ReviewDeletePolicy::Owner,
    };

    let denied = uc.execute(Uuid::now_v7(), review.id).await;
    assert!(
        matches!(denied, Err(MarketplaceError::NotReviewAuthor)),
        "expected NotReviewAuthor, got {denied:?}"
    );

    uc.execute(author, review.id).await.unwrap();
    let missing = uc.execute(author, review.id).await;
    assert!(matches!(missing, Err(MarketplaceError::ReviewNotFound)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_count_every_concurrent_review() {
    const AUTHORS: usize = 16;
    let course = rated_course();
    let course_id = course.id;
    let repo = MockReviewRepo::new(vec![course]);

    let handles: Vec<_> = (0..AUTHORS)
        .map(|i| {
            let uc = CreateReviewUseCase { repo: repo.clone() };
            let rating = (i % 5) as i64 + 1;
            tokio::spawn(async move {
                uc.execute(Uuid::now_v7(), review_input(course_id, rating))
                    .await
            })
        })
        .collect();
    for handle in futures::future::join_all(handles).await {
        handle.unwrap().unwrap();
    }

    let stored = repo.course(course_id).unwrap();
    let expected: i64 = (0..AUTHORS).map(|i| (i % 5) as i64 + 1).sum();
    assert_eq!(stored.number_of_reviews, AUTHORS as i32);
    assert!((stored.average_rating - expected as f64 / AUTHORS as f64).abs() < 1e-9);
}
