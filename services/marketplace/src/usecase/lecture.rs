use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::lecture::{DEFAULT_LECTURE_CONTENT, LectureKind};
use learnhub_domain::pagination::PageRequest;

use crate::domain::repository::{LectureRepository, MediaStoragePort, SectionRepository};
use crate::domain::types::{CONTENT_FOLDER, Lecture, LectureDetail, ResourceType, StagedFile};
use crate::error::MarketplaceError;
use crate::usecase::{optional, optional_id, required, required_id};

/// Upload lecture files one after another, keeping their order, and fold
/// their media types over `initial`.
async fn upload_content<M: MediaStoragePort>(
    media: &M,
    files: &[StagedFile],
    initial: LectureKind,
) -> Result<(Vec<String>, LectureKind), MarketplaceError> {
    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        let resource_type = ResourceType::for_mime(&file.content_type);
        urls.push(media.upload(file, CONTENT_FOLDER, resource_type).await?);
    }
    let kind = LectureKind::infer(initial, files.iter().map(|f| f.content_type.as_str()));
    Ok((urls, kind))
}

// ── CreateLecture ────────────────────────────────────────────────────────────

pub struct CreateLectureInput {
    pub title: Option<String>,
    pub section_id: Option<String>,
    pub content: Vec<StagedFile>,
}

pub struct CreateLectureUseCase<L: LectureRepository, S: SectionRepository, M: MediaStoragePort> {
    pub lectures: L,
    pub sections: S,
    pub media: M,
}

impl<L, S, M> CreateLectureUseCase<L, S, M>
where
    L: LectureRepository,
    S: SectionRepository,
    M: MediaStoragePort,
{
    pub async fn execute(&self, input: CreateLectureInput) -> Result<Lecture, MarketplaceError> {
        let title = required(input.title, "title")?;
        let section_id = required_id(input.section_id, "sectionId")?;
        if self.sections.find_by_id(section_id).await?.is_none() {
            return Err(MarketplaceError::SectionNotFound);
        }

        let (content, kind) = if input.content.is_empty() {
            (vec![DEFAULT_LECTURE_CONTENT.to_owned()], LectureKind::Text)
        } else {
            upload_content(&self.media, &input.content, LectureKind::Text).await?
        };

        let now = Utc::now();
        let lecture = Lecture {
            id: Uuid::now_v7(),
            title,
            content,
            kind,
            section_id,
            created_at: now,
            updated_at: now,
        };
        self.lectures.create(&lecture).await?;
        Ok(lecture)
    }
}

// ── ListLectures / GetLecture ────────────────────────────────────────────────

pub struct ListLecturesUseCase<R: LectureRepository> {
    pub repo: R,
}

impl<R: LectureRepository> ListLecturesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<LectureDetail>, MarketplaceError> {
        self.repo.list_details(page.clamped()).await
    }
}

pub struct GetLectureUseCase<R: LectureRepository> {
    pub repo: R,
}

impl<R: LectureRepository> GetLectureUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<LectureDetail, MarketplaceError> {
        self.repo
            .find_detail(id)
            .await?
            .ok_or(MarketplaceError::LectureNotFound)
    }
}

// ── UpdateLecture ────────────────────────────────────────────────────────────

pub struct UpdateLectureInput {
    pub title: Option<String>,
    pub section_id: Option<String>,
    pub content: Vec<StagedFile>,
}

pub struct UpdateLectureUseCase<L: LectureRepository, S: SectionRepository, M: MediaStoragePort> {
    pub lectures: L,
    pub sections: S,
    pub media: M,
}

impl<L, S, M> UpdateLectureUseCase<L, S, M>
where
    L: LectureRepository,
    S: SectionRepository,
    M: MediaStoragePort,
{
    /// New files replace the whole content list; without files the previous
    /// content and kind stay.
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateLectureInput,
    ) -> Result<Lecture, MarketplaceError> {
        let mut lecture = self
            .lectures
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::LectureNotFound)?;

        if let Some(section_id) = optional_id(input.section_id, "sectionId")? {
            if self.sections.find_by_id(section_id).await?.is_none() {
                return Err(MarketplaceError::SectionNotFound);
            }
            lecture.section_id = section_id;
        }
        if let Some(title) = optional(input.title) {
            lecture.title = title;
        }
        if !input.content.is_empty() {
            let (content, kind) = upload_content(&self.media, &input.content, lecture.kind).await?;
            lecture.content = content;
            lecture.kind = kind;
        }

        lecture.updated_at = Utc::now();
        self.lectures.update(&lecture).await?;
        Ok(lecture)
    }
}

// ── DeleteLecture ────────────────────────────────────────────────────────────

pub struct DeleteLectureUseCase<R: LectureRepository> {
    pub repo: R,
}

impl<R: LectureRepository> DeleteLectureUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(MarketplaceError::LectureNotFound)
        }
    }
}
