use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::pagination::PageRequest;

use crate::domain::repository::{CourseRepository, SectionRepository};
use crate::domain::types::{Section, SectionDetail};
use crate::error::MarketplaceError;
use crate::usecase::{optional, optional_id, required, required_id};

pub struct CreateSectionInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub course_id: Option<String>,
}

pub struct CreateSectionUseCase<S: SectionRepository, C: CourseRepository> {
    pub sections: S,
    pub courses: C,
}

impl<S: SectionRepository, C: CourseRepository> CreateSectionUseCase<S, C> {
    pub async fn execute(&self, input: CreateSectionInput) -> Result<Section, MarketplaceError> {
        let title = required(input.title, "title")?;
        let course_id = required_id(input.course_id, "courseId")?;
        if self.courses.find_by_id(course_id).await?.is_none() {
            return Err(MarketplaceError::CourseNotFound);
        }

        let now = Utc::now();
        let section = Section {
            id: Uuid::now_v7(),
            title,
            description: optional(input.description),
            course_id,
            created_at: now,
            updated_at: now,
        };
        self.sections.create(&section).await?;
        Ok(section)
    }
}

pub struct ListSectionsUseCase<R: SectionRepository> {
    pub repo: R,
}

impl<R: SectionRepository> ListSectionsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<SectionDetail>, MarketplaceError> {
        self.repo.list_details(page.clamped()).await
    }
}

pub struct GetSectionUseCase<R: SectionRepository> {
    pub repo: R,
}

impl<R: SectionRepository> GetSectionUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<SectionDetail, MarketplaceError> {
        self.repo
            .find_detail(id)
            .await?
            .ok_or(MarketplaceError::SectionNotFound)
    }
}

pub struct UpdateSectionInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub course_id: Option<String>,
}

pub struct UpdateSectionUseCase<S: SectionRepository, C: CourseRepository> {
    pub sections: S,
    pub courses: C,
}

impl<S: SectionRepository, C: CourseRepository> UpdateSectionUseCase<S, C> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateSectionInput,
    ) -> Result<Section, MarketplaceError> {
        let mut section = self
            .sections
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::SectionNotFound)?;

        if let Some(course_id) = optional_id(input.course_id, "courseId")? {
            if self.courses.find_by_id(course_id).await?.is_none() {
                return Err(MarketplaceError::CourseNotFound);
            }
            section.course_id = course_id;
        }
        if let Some(title) = optional(input.title) {
            section.title = title;
        }
        if let Some(description) = optional(input.description) {
            section.description = Some(description);
        }

        section.updated_at = Utc::now();
        self.sections.update(&section).await?;
        Ok(section)
    }
}

pub struct DeleteSectionUseCase<R: SectionRepository> {
    pub repo: R,
}

impl<R: SectionRepository> DeleteSectionUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(MarketplaceError::SectionNotFound)
        }
    }
}
