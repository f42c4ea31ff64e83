#![allow(async_fn_in_trait)]

use uuid::Uuid;

use learnhub_domain::order::PaymentStatus;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::UserRole;

use crate::domain::types::{
    Category, CategoryDetail, CheckoutRequest, CheckoutSession, Course, CourseDetail,
    CourseRating, Lecture, LectureDetail, NewUser, Order, OrderDetail, ResourceType, Review,
    ReviewPatch, Section, SectionDetail, StagedFile, User, UserPatch,
};
use crate::error::MarketplaceError;

/// Repository for marketplace accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, MarketplaceError>;

    /// Insert a new account. The role is `ADMIN` when no account exists yet
    /// and `STUDENT` otherwise; counting and inserting are atomic.
    ///
    /// Fails with `EmailTaken` when the email is already registered.
    async fn register(&self, user: &NewUser) -> Result<User, MarketplaceError>;

    /// Apply the present fields of `patch`. Fails with `UserNotFound` or
    /// `EmailTaken`.
    async fn update_profile(&self, id: Uuid, patch: &UserPatch) -> Result<User, MarketplaceError>;

    async fn update_password(&self, id: Uuid, password_hash: &str)
    -> Result<(), MarketplaceError>;

    /// Returns `None` when the user does not exist.
    async fn update_role(&self, id: Uuid, role: UserRole)
    -> Result<Option<User>, MarketplaceError>;
}

/// Repository for course categories.
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketplaceError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<CategoryDetail>, MarketplaceError>;
    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<CategoryDetail>, MarketplaceError>;

    /// Fails with `CategoryNameTaken` on a duplicate name.
    async fn create(&self, category: &Category) -> Result<(), MarketplaceError>;

    /// Fails with `CategoryNameTaken` on a duplicate name.
    async fn update(&self, category: &Category) -> Result<(), MarketplaceError>;

    /// Returns `false` when nothing was deleted. Fails with `CategoryInUse`
    /// while courses still reference the category.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for courses.
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, MarketplaceError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<CourseDetail>, MarketplaceError>;
    async fn list_details(&self, page: PageRequest)
    -> Result<Vec<CourseDetail>, MarketplaceError>;
    async fn create(&self, course: &Course) -> Result<(), MarketplaceError>;

    /// Persist the editable fields (title, description, price, is_paid,
    /// image, category). Rating fields are owned by review writes.
    async fn update(&self, course: &Course) -> Result<(), MarketplaceError>;

    /// Sections, lectures, reviews and orders go with the course.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for course sections.
pub trait SectionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Section>, MarketplaceError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<SectionDetail>, MarketplaceError>;
    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<SectionDetail>, MarketplaceError>;
    async fn create(&self, section: &Section) -> Result<(), MarketplaceError>;
    async fn update(&self, section: &Section) -> Result<(), MarketplaceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for lectures.
pub trait LectureRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lecture>, MarketplaceError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<LectureDetail>, MarketplaceError>;
    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<LectureDetail>, MarketplaceError>;
    async fn create(&self, lecture: &Lecture) -> Result<(), MarketplaceError>;
    async fn update(&self, lecture: &Lecture) -> Result<(), MarketplaceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for course purchases.
pub trait OrderRepository: Send + Sync {
    /// The user's COMPLETED order for the course, if any.
    async fn find_completed(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Order>, MarketplaceError>;
    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, MarketplaceError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, MarketplaceError>;
    async fn list_details(&self, page: PageRequest)
    -> Result<Vec<OrderDetail>, MarketplaceError>;
    async fn create(&self, order: &Order) -> Result<(), MarketplaceError>;
    /// Set the payment status unless the stored order is already
    /// `COMPLETED`. Returns `false` when no row changed.
    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool, MarketplaceError>;
}

/// Repository for reviews.
///
/// Every write recomputes the course's rating aggregate in the same
/// transaction, with the course row locked, and returns the new values.
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, MarketplaceError>;

    /// Fails with `CourseNotFound` or `ReviewAlreadyExists`.
    async fn create_rated(&self, review: &Review) -> Result<CourseRating, MarketplaceError>;

    /// Fails with `ReviewNotFound`.
    async fn update_rated(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
    ) -> Result<(Review, CourseRating), MarketplaceError>;

    /// Fails with `ReviewNotFound`.
    async fn delete_rated(&self, id: Uuid) -> Result<CourseRating, MarketplaceError>;
}

/// Hosted checkout provider.
pub trait PaymentPort: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, MarketplaceError>;
}

/// Remote media store. Returns the public URL of the uploaded file.
pub trait MediaStoragePort: Send + Sync {
    async fn upload(
        &self,
        file: &StagedFile,
        folder: &str,
        resource_type: ResourceType,
    ) -> Result<String, MarketplaceError>;
}
