use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use learnhub_auth_types::identity::Session;
use learnhub_domain::lecture::LectureKind;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::COURSE_AUTHORS;

use crate::domain::types::{Lecture, LectureDetail};
use crate::error::MarketplaceError;
use crate::handlers::course::TitledRef;
use crate::handlers::upload::read_multipart;
use crate::handlers::{ApiMultipart, ApiQuery, MessageResponse, path_id, require_role};
use crate::state::AppState;
use crate::usecase::lecture::{
    CreateLectureInput, CreateLectureUseCase, DeleteLectureUseCase, GetLectureUseCase,
    ListLecturesUseCase, UpdateLectureInput, UpdateLectureUseCase,
};

/// Multipart part name for lecture files; repeat it to send several.
const CONTENT_FIELD: &str = "content";

#[derive(Serialize)]
pub struct LectureResponse {
    pub id: Uuid,
    pub title: String,
    pub content: Vec<String>,
    #[serde(rename = "type")]
    pub kind: LectureKind,
    pub section_id: Uuid,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Lecture> for LectureResponse {
    fn from(lecture: Lecture) -> Self {
        Self {
            id: lecture.id,
            title: lecture.title,
            content: lecture.content,
            kind: lecture.kind,
            section_id: lecture.section_id,
            created_at: lecture.created_at,
            updated_at: lecture.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct LectureDetailResponse {
    #[serde(flatten)]
    pub lecture: LectureResponse,
    pub section: Option<TitledRef>,
}

impl From<LectureDetail> for LectureDetailResponse {
    fn from(detail: LectureDetail) -> Self {
        Self {
            lecture: detail.lecture.into(),
            section: detail.section.map(|s| TitledRef {
                id: s.id,
                title: s.title,
            }),
        }
    }
}

#[derive(Serialize)]
pub struct LectureEnvelope<T> {
    pub lecture: T,
}

// ── POST /lectures ───────────────────────────────────────────────────────────

pub async fn create_lecture(
    session: Session,
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<LectureEnvelope<LectureResponse>>), MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let mut form = read_multipart(multipart, &state.upload_dir).await?;
    let usecase = CreateLectureUseCase {
        lectures: state.lecture_repo(),
        sections: state.section_repo(),
        media: state.media.clone(),
    };
    let lecture = usecase
        .execute(CreateLectureInput {
            title: form.text("title"),
            section_id: form.text("sectionId"),
            content: form.files(CONTENT_FIELD),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(LectureEnvelope {
            lecture: lecture.into(),
        }),
    ))
}

// ── GET /lectures ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LectureListResponse {
    pub lectures: Vec<LectureDetailResponse>,
}

pub async fn list_lectures(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<LectureListResponse>, MarketplaceError> {
    let usecase = ListLecturesUseCase {
        repo: state.lecture_repo(),
    };
    let lectures = usecase.execute(page).await?;
    Ok(Json(LectureListResponse {
        lectures: lectures.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /lectures/{id} ───────────────────────────────────────────────────────

pub async fn get_lecture(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LectureEnvelope<LectureDetailResponse>>, MarketplaceError> {
    let usecase = GetLectureUseCase {
        repo: state.lecture_repo(),
    };
    let detail = usecase.execute(path_id(&id)?).await?;
    Ok(Json(LectureEnvelope {
        lecture: detail.into(),
    }))
}

// ── PATCH /lectures/{id} ─────────────────────────────────────────────────────

pub async fn update_lecture(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<LectureEnvelope<LectureResponse>>, MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let lecture_id = path_id(&id)?;
    let mut form = read_multipart(multipart, &state.upload_dir).await?;
    let usecase = UpdateLectureUseCase {
        lectures: state.lecture_repo(),
        sections: state.section_repo(),
        media: state.media.clone(),
    };
    let lecture = usecase
        .execute(
            lecture_id,
            UpdateLectureInput {
                title: form.text("title"),
                section_id: form.text("sectionId"),
                content: form.files(CONTENT_FIELD),
            },
        )
        .await?;
    Ok(Json(LectureEnvelope {
        lecture: lecture.into(),
    }))
}

// ── DELETE /lectures/{id} ────────────────────────────────────────────────────

pub async fn delete_lecture(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MarketplaceError> {
    require_role(&session, COURSE_AUTHORS)?;
    let usecase = DeleteLectureUseCase {
        repo: state.lecture_repo(),
    };
    usecase.execute(path_id(&id)?).await?;
    Ok(MessageResponse::new("lecture deleted"))
}
