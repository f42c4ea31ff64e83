use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use learnhub_auth_types::identity::Session;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::COURSE_AUTHORS;

use crate::domain::types::{Course, CourseDetail};
use crate::error::MarketplaceError;
use crate::handlers::upload::read_multipart;
use crate::handlers::{ApiMultipart, ApiQuery, MessageResponse, path_id, require_role};
use crate::state::AppState;
use crate::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, DeleteCourseUseCase, GetCourseUseCase,
    ListCoursesUseCase, UpdateCourseInput, UpdateCourseUseCase,
};

#[derive(Serialize)]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub is_paid: bool,
    pub image: String,
    pub average_rating: f64,
    pub number_of_reviews: i32,
    pub category_id: Uuid,
    pub instructor_id: Uuid,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            price: course.price,
            is_paid: course.is_paid,
            image: course.image,
            average_rating: course.average_rating,
            number_of_reviews: course.number_of_reviews,
            category_id: course.category_id,
            instructor_id: course.instructor_id,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
pub struct InstructorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct TitledRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Serialize)]
pub struct OrderRefResponse {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub category: Option<NamedRef>,
    pub instructor: Option<InstructorResponse>,
    pub sections: Vec<TitledRef>,
    pub orders: Vec<OrderRefResponse>,
}

impl From<CourseDetail> for CourseDetailResponse {
    fn from(detail: CourseDetail) -> Self {
        Self {
            course: detail.course.into(),
            category: detail.category.map(|c| NamedRef {
                id: c.id,
                name: c.name,
            }),
            instructor: detail.instructor.map(|i| InstructorResponse {
                id: i.id,
                name: i.name,
                email: i.email,
            }),
            sections: detail
                .sections
                .into_iter()
                .map(|s| TitledRef {
                    id: s.id,
                    title: s.title,
                })
                .collect(),
            orders: detail
                .orders
                .into_iter()
                .map(|o| OrderRefResponse {
                    id: o.id,
                    user_id: o.user_id,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct CourseMutationResponse {
    pub msg: &'static str,
    pub course: CourseResponse,
}

// ── POST /courses ────────────────────────────────────────────────────────────

pub async fn create_course(
    session: Session,
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<CourseMutationResponse>), MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let mut form = read_multipart(multipart, &state.upload_dir).await?;
    let usecase = CreateCourseUseCase {
        courses: state.course_repo(),
        categories: state.category_repo(),
        media: state.media.clone(),
    };
    let course = usecase
        .execute(
            session.user_id,
            CreateCourseInput {
                title: form.text("title"),
                description: form.text("description"),
                price: form.text("price"),
                category_id: form.text("categoryId"),
                image: form.file("image"),
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CourseMutationResponse {
            msg: "course created",
            course: course.into(),
        }),
    ))
}

// ── GET /courses ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseDetailResponse>,
}

pub async fn list_courses(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<CourseListResponse>, MarketplaceError> {
    let usecase = ListCoursesUseCase {
        repo: state.course_repo(),
    };
    let courses = usecase.execute(page).await?;
    Ok(Json(CourseListResponse {
        courses: courses.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /courses/{id} ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CourseEnvelope {
    pub course: CourseDetailResponse,
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseEnvelope>, MarketplaceError> {
    let usecase = GetCourseUseCase {
        repo: state.course_repo(),
    };
    let detail = usecase.execute(path_id(&id)?).await?;
    Ok(Json(CourseEnvelope {
        course: detail.into(),
    }))
}

// ── PATCH /courses/{id} ──────────────────────────────────────────────────────

pub async fn update_course(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<CourseMutationResponse>, MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let course_id = path_id(&id)?;
    let mut form = read_multipart(multipart, &state.upload_dir).await?;
    let usecase = UpdateCourseUseCase {
        courses: state.course_repo(),
        categories: state.category_repo(),
        media: state.media.clone(),
    };
    let course = usecase
        .execute(
            session.user_id,
            course_id,
            UpdateCourseInput {
                title: form.text("title"),
                description: form.text("description"),
                price: form.text("price"),
                category_id: form.text("categoryId"),
                image: form.file("image"),
            },
        )
        .await?;
    Ok(Json(CourseMutationResponse {
        msg: "course updated",
        course: course.into(),
    }))
}

// ── DELETE /courses/{id} ─────────────────────────────────────────────────────

pub async fn delete_course(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let usecase = DeleteCourseUseCase {
        repo: state.course_repo(),
    };
    usecase.execute(path_id(&id)?).await?;
    Ok(MessageResponse::new("course deleted"))
}
