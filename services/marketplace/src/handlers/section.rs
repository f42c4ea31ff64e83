use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_auth_types::identity::Session;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::COURSE_AUTHORS;

use crate::domain::types::{Section, SectionDetail};
use crate::error::MarketplaceError;
use crate::handlers::course::TitledRef;
use crate::handlers::{ApiJson, ApiQuery, MessageResponse, path_id, require_role};
use crate::state::AppState;
use crate::usecase::section::{
    CreateSectionInput, CreateSectionUseCase, DeleteSectionUseCase, GetSectionUseCase,
    ListSectionsUseCase, UpdateSectionInput, UpdateSectionUseCase,
};

#[derive(Serialize)]
pub struct SectionResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub course_id: Uuid,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Section> for SectionResponse {
    fn from(section: Section) -> Self {
        Self {
            id: section.id,
            title: section.title,
            description: section.description,
            course_id: section.course_id,
            created_at: section.created_at,
            updated_at: section.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct SectionDetailResponse {
    #[serde(flatten)]
    pub section: SectionResponse,
    pub course: Option<TitledRef>,
}

impl From<SectionDetail> for SectionDetailResponse {
    fn from(detail: SectionDetail) -> Self {
        Self {
            section: detail.section.into(),
            course: detail.course.map(|c| TitledRef {
                id: c.id,
                title: c.title,
            }),
        }
    }
}

#[derive(Serialize)]
pub struct SectionEnvelope<T> {
    pub section: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub course_id: Option<String>,
}

// ── POST /sections ───────────────────────────────────────────────────────────

pub async fn create_section(
    session: Session,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SectionRequest>,
) -> Result<(StatusCode, Json<SectionEnvelope<SectionResponse>>), MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let usecase = CreateSectionUseCase {
        sections: state.section_repo(),
        courses: state.course_repo(),
    };
    let section = usecase
        .execute(CreateSectionInput {
            title: body.title,
            description: body.description,
            course_id: body.course_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SectionEnvelope {
            section: section.into(),
        }),
    ))
}

// ── GET /sections ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SectionListResponse {
    pub sections: Vec<SectionDetailResponse>,
}

pub async fn list_sections(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<SectionListResponse>, MarketplaceError> {
    let usecase = ListSectionsUseCase {
        repo: state.section_repo(),
    };
    let sections = usecase.execute(page).await?;
    Ok(Json(SectionListResponse {
        sections: sections.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /sections/{id} ───────────────────────────────────────────────────────

pub async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SectionEnvelope<SectionDetailResponse>>, MarketplaceError> {
    let usecase = GetSectionUseCase {
        repo: state.section_repo(),
    };
    let detail = usecase.execute(path_id(&id)?).await?;
    Ok(Json(SectionEnvelope {
        section: detail.into(),
    }))
}

// ── PATCH /sections/{id} ─────────────────────────────────────────────────────

pub async fn update_section(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SectionRequest>,
) -> Result<Json<SectionEnvelope<SectionResponse>>, MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let usecase = UpdateSectionUseCase {
        sections: state.section_repo(),
        courses: state.course_repo(),
    };
    let section = usecase
        .execute(
            path_id(&id)?,
            UpdateSectionInput {
                title: body.title,
                description: body.description,
                course_id: body.course_id,
            },
        )
        .await?;
    Ok(Json(SectionEnvelope {
        section: section.into(),
    }))
}

// ── DELETE /sections/{id} ────────────────────────────────────────────────────

pub async fn delete_section(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let usecase = DeleteSectionUseCase {
        repo: state.section_repo(),
    };
    usecase.execute(path_id(&id)?).await?;
    Ok(MessageResponse::new("section deleted"))
}
