use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_auth_types::identity::Session;
use learnhub_domain::pagination::PageRequest;

use crate::domain::types::{Category, CategoryDetail, CourseBrief};
use crate::error::MarketplaceError;
use crate::handlers::{ApiJson, ApiQuery, MessageResponse, path_id};
use crate::state::AppState;
use crate::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryInput, UpdateCategoryUseCase,
};

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CourseBriefResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
}

impl From<CourseBrief> for CourseBriefResponse {
    fn from(course: CourseBrief) -> Self {
        Self {
            id: course.id,
            title: course.title,
            price: course.price,
        }
    }
}

#[derive(Serialize)]
pub struct CategoryDetailResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub courses: Vec<CourseBriefResponse>,
}

impl From<CategoryDetail> for CategoryDetailResponse {
    fn from(detail: CategoryDetail) -> Self {
        Self {
            category: detail.category.into(),
            courses: detail.courses.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct CategoryEnvelope<T> {
    pub category: T,
}

#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// ── POST /categories ─────────────────────────────────────────────────────────

pub async fn create_category(
    _session: Session,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryEnvelope<CategoryResponse>>), MarketplaceError> {
    let usecase = CreateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase
        .execute(CreateCategoryInput {
            name: body.name,
            description: body.description,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryEnvelope {
            category: category.into(),
        }),
    ))
}

// ── GET /categories ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryDetailResponse>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<CategoryListResponse>, MarketplaceError> {
    let usecase = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let categories = usecase.execute(page).await?;
    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /categories/{id} ─────────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryEnvelope<CategoryDetailResponse>>, MarketplaceError> {
    let usecase = GetCategoryUseCase {
        repo: state.category_repo(),
    };
    let detail = usecase.execute(path_id(&id)?).await?;
    Ok(Json(CategoryEnvelope {
        category: detail.into(),
    }))
}

// ── PATCH /categories/{id} ───────────────────────────────────────────────────

pub async fn update_category(
    _session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<Json<CategoryEnvelope<CategoryResponse>>, MarketplaceError> {
    let usecase = UpdateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase
        .execute(
            path_id(&id)?,
            UpdateCategoryInput {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(CategoryEnvelope {
        category: category.into(),
    }))
}

// ── DELETE /categories/{id} ──────────────────────────────────────────────────

pub async fn delete_category(
    _session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MarketplaceError> {
    let usecase = DeleteCategoryUseCase {
        repo: state.category_repo(),
    };
    usecase.execute(path_id(&id)?).await?;
    Ok(MessageResponse::new("category deleted"))
}
