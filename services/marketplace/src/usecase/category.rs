use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::pagination::PageRequest;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::{Category, CategoryDetail};
use crate::error::MarketplaceError;
use crate::usecase::{optional, required};

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CreateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct CreateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> CreateCategoryUseCase<R> {
    pub async fn execute(&self, input: CreateCategoryInput) -> Result<Category, MarketplaceError> {
        let name = required(input.name, "name")?;
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name,
            description: optional(input.description),
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&category).await?;
        Ok(category)
    }
}

// ── ListCategories / GetCategory ─────────────────────────────────────────────

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<CategoryDetail>, MarketplaceError> {
        self.repo.list_details(page.clamped()).await
    }
}

pub struct GetCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> GetCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<CategoryDetail, MarketplaceError> {
        self.repo
            .find_detail(id)
            .await?
            .ok_or(MarketplaceError::CategoryNotFound)
    }
}

// ── UpdateCategory ───────────────────────────────────────────────────────────

pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct UpdateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> UpdateCategoryUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<Category, MarketplaceError> {
        let name = optional(input.name);
        let description = optional(input.description);
        if name.is_none() && description.is_none() {
            return Err(MarketplaceError::NothingToUpdate);
        }

        let mut category = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::CategoryNotFound)?;
        if let Some(name) = name {
            category.name = name;
        }
        if description.is_some() {
            category.description = description;
        }
        category.updated_at = Utc::now();
        self.repo.update(&category).await?;
        Ok(category)
    }
}

// ── DeleteCategory ───────────────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> DeleteCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(MarketplaceError::CategoryNotFound)
        }
    }
}
