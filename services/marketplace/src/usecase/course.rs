use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::course::{DEFAULT_COURSE_IMAGE, is_paid, parse_price};
use learnhub_domain::pagination::PageRequest;

use crate::domain::repository::{CategoryRepository, CourseRepository, MediaStoragePort};
use crate::domain::types::{Course, CourseDetail, IMAGE_FOLDER, ResourceType, StagedFile};
use crate::error::MarketplaceError;
use crate::usecase::{optional, optional_id, required, required_id};

// ── CreateCourse ─────────────────────────────────────────────────────────────

pub struct CreateCourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub image: Option<StagedFile>,
}

pub struct CreateCourseUseCase<C: CourseRepository, K: CategoryRepository, M: MediaStoragePort> {
    pub courses: C,
    pub categories: K,
    pub media: M,
}

impl<C, K, M> CreateCourseUseCase<C, K, M>
where
    C: CourseRepository,
    K: CategoryRepository,
    M: MediaStoragePort,
{
    pub async fn execute(
        &self,
        instructor_id: Uuid,
        input: CreateCourseInput,
    ) -> Result<Course, MarketplaceError> {
        let title = required(input.title, "title")?;
        let price = parse_price(&required(input.price, "price")?)?;
        let category_id = required_id(input.category_id, "categoryId")?;

        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(MarketplaceError::CategoryNotFound);
        }

        let image = match input.image {
            Some(file) => {
                self.media
                    .upload(&file, IMAGE_FOLDER, ResourceType::Auto)
                    .await?
            }
            None => DEFAULT_COURSE_IMAGE.to_owned(),
        };

        let now = Utc::now();
        let course = Course {
            id: Uuid::now_v7(),
            title,
            description: optional(input.description),
            price,
            is_paid: is_paid(price),
            image,
            average_rating: 0.0,
            number_of_reviews: 0,
            category_id,
            instructor_id,
            created_at: now,
            updated_at: now,
        };
        self.courses.create(&course).await?;
        tracing::info!(course_id = %course.id, %instructor_id, "created course");
        Ok(course)
    }
}

// ── ListCourses / GetCourse ──────────────────────────────────────────────────

pub struct ListCoursesUseCase<R: CourseRepository> {
    pub repo: R,
}

impl<R: CourseRepository> ListCoursesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<CourseDetail>, MarketplaceError> {
        self.repo.list_details(page.clamped()).await
    }
}

pub struct GetCourseUseCase<R: CourseRepository> {
    pub repo: R,
}

impl<R: CourseRepository> GetCourseUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<CourseDetail, MarketplaceError> {
        self.repo
            .find_detail(id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)
    }
}

// ── UpdateCourse ─────────────────────────────────────────────────────────────

pub struct UpdateCourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub image: Option<StagedFile>,
}

pub struct UpdateCourseUseCase<C: CourseRepository, K: CategoryRepository, M: MediaStoragePort> {
    pub courses: C,
    pub categories: K,
    pub media: M,
}

impl<C, K, M> UpdateCourseUseCase<C, K, M>
where
    C: CourseRepository,
    K: CategoryRepository,
    M: MediaStoragePort,
{
    /// Only the course's own instructor may edit it, administrators included.
    pub async fn execute(
        &self,
        editor_id: Uuid,
        course_id: Uuid,
        input: UpdateCourseInput,
    ) -> Result<Course, MarketplaceError> {
        let mut course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)?;
        if course.instructor_id != editor_id {
            return Err(MarketplaceError::NotCourseOwner);
        }

        if let Some(raw) = optional(input.price) {
            let price = parse_price(&raw)?;
            course.price = price;
            course.is_paid = is_paid(price);
        }
        if let Some(category_id) = optional_id(input.category_id, "categoryId")? {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(MarketplaceError::CategoryNotFound);
            }
            course.category_id = category_id;
        }
        if let Some(title) = optional(input.title) {
            course.title = title;
        }
        if let Some(description) = optional(input.description) {
            course.description = Some(description);
        }
        if let Some(file) = input.image {
            course.image = self
                .media
                .upload(&file, IMAGE_FOLDER, ResourceType::Auto)
                .await?;
        }

        course.updated_at = Utc::now();
        self.courses.update(&course).await?;
        Ok(course)
    }
}

// ── DeleteCourse ─────────────────────────────────────────────────────────────

pub struct DeleteCourseUseCase<R: CourseRepository> {
    pub repo: R,
}

impl<R: CourseRepository> DeleteCourseUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if self.repo.delete(id).await? {
            tracing::info!(course_id = %id, "deleted course");
            Ok(())
        } else {
            Err(MarketplaceError::CourseNotFound)
        }
    }
}
