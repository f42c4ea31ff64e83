use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use learnhub_domain::order::PaymentStatus;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::review::RatingAggregate;
use learnhub_domain::user::UserRole;
use learnhub_marketplace::domain::repository::{
    CategoryRepository, CourseRepository, LectureRepository, MediaStoragePort, OrderRepository,
    PaymentPort, ReviewRepository, SectionRepository, UserRepository,
};
use learnhub_marketplace::domain::types::{
    Category, CategoryDetail, CheckoutRequest, CheckoutSession, Course, CourseDetail,
    CourseRating, Lecture, LectureDetail, NewUser, Order, OrderDetail, ResourceType, Review,
    ReviewPatch, Section, SectionDetail, StagedFile, User, UserPatch,
};
use learnhub_marketplace::error::MarketplaceError;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration";

/// Cheapest cost bcrypt accepts.
pub const TEST_BCRYPT_COST: u32 = 4;

// ── Builders ─────────────────────────────────────────────────────────────────

pub fn test_user(role: UserRole) -> User {
    let now = Utc::now();
    let id = Uuid::now_v7();
    User {
        id,
        name: format!("user-{}", &id.simple().to_string()[..8]),
        email: format!("{id}@example.com"),
        password_hash: String::new(),
        role,
        bio: None,
        profile_picture: "/uploads/default.jpeg".into(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_category(name: &str) -> Category {
    let now = Utc::now();
    Category {
        id: Uuid::now_v7(),
        name: name.into(),
        description: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_course(instructor_id: Uuid, category_id: Uuid, price: Decimal) -> Course {
    let now = Utc::now();
    Course {
        id: Uuid::now_v7(),
        title: "Ownership in Practice".into(),
        description: Some("Borrowing without tears".into()),
        price,
        is_paid: price > Decimal::ZERO,
        image: "/uploads/course.png".into(),
        average_rating: 0.0,
        number_of_reviews: 0,
        category_id,
        instructor_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_section(course_id: Uuid) -> Section {
    let now = Utc::now();
    Section {
        id: Uuid::now_v7(),
        title: "Getting started".into(),
        description: None,
        course_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_order(user_id: Uuid, course_id: Uuid, status: PaymentStatus) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::now_v7(),
        user_id,
        course_id,
        price: Decimal::new(1999, 2),
        payment_status: status,
        payment_session_id: format!("cs_test_{}", Uuid::new_v4().simple()),
        created_at: now,
        updated_at: now,
    }
}

/// A real file in the temp directory, removed when the value drops.
pub fn staged_file(file_name: &str, content_type: &str) -> StagedFile {
    let path: PathBuf = std::env::temp_dir().join(format!("learnhub-test-{}", Uuid::new_v4()));
    std::fs::write(&path, b"test payload").unwrap();
    StagedFile {
        path,
        file_name: file_name.into(),
        content_type: content_type.into(),
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, MarketplaceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn register(&self, user: &NewUser) -> Result<User, MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(MarketplaceError::EmailTaken);
        }
        let created = User {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: UserRole::for_registration(users.len() as u64),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_profile(&self, id: Uuid, patch: &UserPatch) -> Result<User, MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(MarketplaceError::UserNotFound)?;
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(bio) = &patch.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(picture) = &patch.profile_picture {
            user.profile_picture = picture.clone();
        }
        Ok(user.clone())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(MarketplaceError::UserNotFound)?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<User>, MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }
}

// ── MockCategoryRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCategoryRepo {
    pub categories: Arc<Mutex<Vec<Category>>>,
}

impl MockCategoryRepo {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Arc::new(Mutex::new(categories)),
        }
    }
}

impl CategoryRepository for MockCategoryRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketplaceError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<CategoryDetail>, MarketplaceError> {
        Ok(self.find_by_id(id).await?.map(|category| CategoryDetail {
            category,
            courses: vec![],
        }))
    }

    async fn list_details(
        &self,
        _page: PageRequest,
    ) -> Result<Vec<CategoryDetail>, MarketplaceError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|category| CategoryDetail {
                category,
                courses: vec![],
            })
            .collect())
    }

    async fn create(&self, category: &Category) -> Result<(), MarketplaceError> {
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.name == category.name) {
            return Err(MarketplaceError::CategoryNameTaken);
        }
        categories.push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), MarketplaceError> {
        let mut categories = self.categories.lock().unwrap();
        if categories
            .iter()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(MarketplaceError::CategoryNameTaken);
        }
        let slot = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(MarketplaceError::CategoryNotFound)?;
        *slot = category.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() != before)
    }
}

// ── MockCourseRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCourseRepo {
    pub courses: Arc<Mutex<Vec<Course>>>,
}

impl MockCourseRepo {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: Arc::new(Mutex::new(courses)),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Course> {
        self.courses.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }
}

fn bare_detail(course: Course) -> CourseDetail {
    CourseDetail {
        course,
        category: None,
        instructor: None,
        sections: vec![],
        orders: vec![],
    }
}

impl CourseRepository for MockCourseRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, MarketplaceError> {
        Ok(self.get(id))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<CourseDetail>, MarketplaceError> {
        Ok(self.get(id).map(bare_detail))
    }

    async fn list_details(
        &self,
        _page: PageRequest,
    ) -> Result<Vec<CourseDetail>, MarketplaceError> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(bare_detail)
            .collect())
    }

    async fn create(&self, course: &Course) -> Result<(), MarketplaceError> {
        self.courses.lock().unwrap().push(course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), MarketplaceError> {
        let mut courses = self.courses.lock().unwrap();
        let slot = courses
            .iter_mut()
            .find(|c| c.id == course.id)
            .ok_or(MarketplaceError::CourseNotFound)?;
        // Rating fields belong to review writes.
        let (average_rating, number_of_reviews) = (slot.average_rating, slot.number_of_reviews);
        *slot = Course {
            average_rating,
            number_of_reviews,
            ..course.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut courses = self.courses.lock().unwrap();
        let before = courses.len();
        courses.retain(|c| c.id != id);
        Ok(courses.len() != before)
    }
}

// ── MockSectionRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSectionRepo {
    pub sections: Arc<Mutex<Vec<Section>>>,
}

impl MockSectionRepo {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections: Arc::new(Mutex::new(sections)),
        }
    }
}

impl SectionRepository for MockSectionRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Section>, MarketplaceError> {
        Ok(self
            .sections
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<SectionDetail>, MarketplaceError> {
        Ok(self
            .find_by_id(id)
            .await?
            .map(|section| SectionDetail {
                section,
                course: None,
            }))
    }

    async fn list_details(
        &self,
        _page: PageRequest,
    ) -> Result<Vec<SectionDetail>, MarketplaceError> {
        Ok(vec![])
    }

    async fn create(&self, section: &Section) -> Result<(), MarketplaceError> {
        self.sections.lock().unwrap().push(section.clone());
        Ok(())
    }

    async fn update(&self, section: &Section) -> Result<(), MarketplaceError> {
        let mut sections = self.sections.lock().unwrap();
        let slot = sections
            .iter_mut()
            .find(|s| s.id == section.id)
            .ok_or(MarketplaceError::SectionNotFound)?;
        *slot = section.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut sections = self.sections.lock().unwrap();
        let before = sections.len();
        sections.retain(|s| s.id != id);
        Ok(sections.len() != before)
    }
}

// ── MockLectureRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLectureRepo {
    pub lectures: Arc<Mutex<Vec<Lecture>>>,
}

impl LectureRepository for MockLectureRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lecture>, MarketplaceError> {
        Ok(self
            .lectures
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<LectureDetail>, MarketplaceError> {
        Ok(self
            .find_by_id(id)
            .await?
            .map(|lecture| LectureDetail {
                lecture,
                section: None,
            }))
    }

    async fn list_details(
        &self,
        _page: PageRequest,
    ) -> Result<Vec<LectureDetail>, MarketplaceError> {
        Ok(vec![])
    }

    async fn create(&self, lecture: &Lecture) -> Result<(), MarketplaceError> {
        self.lectures.lock().unwrap().push(lecture.clone());
        Ok(())
    }

    async fn update(&self, lecture: &Lecture) -> Result<(), MarketplaceError> {
        let mut lectures = self.lectures.lock().unwrap();
        let slot = lectures
            .iter_mut()
            .find(|l| l.id == lecture.id)
            .ok_or(MarketplaceError::LectureNotFound)?;
        *slot = lecture.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut lectures = self.lectures.lock().unwrap();
        let before = lectures.len();
        lectures.retain(|l| l.id != id);
        Ok(lectures.len() != before)
    }
}

// ── MockOrderRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOrderRepo {
    pub orders: Arc<Mutex<Vec<Order>>>,
}

impl MockOrderRepo {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
        }
    }

    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }
}

impl OrderRepository for MockOrderRepo {
    async fn find_completed(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Order>, MarketplaceError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| {
                o.user_id == user_id
                    && o.course_id == course_id
                    && o.payment_status == PaymentStatus::Completed
            })
            .cloned())
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, MarketplaceError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.payment_session_id == session_id)
            .cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, MarketplaceError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .map(|order| OrderDetail {
                order,
                user: None,
                course: None,
            }))
    }

    async fn list_details(
        &self,
        _page: PageRequest,
    ) -> Result<Vec<OrderDetail>, MarketplaceError> {
        Ok(vec![])
    }

    async fn create(&self, order: &Order) -> Result<(), MarketplaceError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool, MarketplaceError> {
        let mut orders = self.orders.lock().unwrap();
        match orders
            .iter_mut()
            .find(|o| o.id == id && o.payment_status != PaymentStatus::Completed)
        {
            Some(order) => {
                order.payment_status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockReviewRepo ───────────────────────────────────────────────────────────

/// Reviews plus the courses they rate. The course list lock plays the part
/// of the row lock: every write holds it while mutating and recomputing.
#[derive(Clone, Default)]
pub struct MockReviewRepo {
    pub reviews: Arc<Mutex<Vec<Review>>>,
    pub courses: Arc<Mutex<Vec<Course>>>,
}

impl MockReviewRepo {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            reviews: Arc::default(),
            courses: Arc::new(Mutex::new(courses)),
        }
    }

    pub fn course(&self, id: Uuid) -> Option<Course> {
        self.courses.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }

    fn recompute(&self, courses: &mut [Course], course_id: Uuid) -> CourseRating {
        let ratings: Vec<i16> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.course_id == course_id)
            .map(|r| r.rating)
            .collect();
        let aggregate = RatingAggregate::from_ratings(&ratings);
        if let Some(course) = courses.iter_mut().find(|c| c.id == course_id) {
            course.average_rating = aggregate.average_rating;
            course.number_of_reviews = aggregate.number_of_reviews;
        }
        CourseRating {
            course_id,
            average_rating: aggregate.average_rating,
            number_of_reviews: aggregate.number_of_reviews,
        }
    }
}

impl ReviewRepository for MockReviewRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, MarketplaceError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create_rated(&self, review: &Review) -> Result<CourseRating, MarketplaceError> {
        let mut courses = self.courses.lock().unwrap();
        if !courses.iter().any(|c| c.id == review.course_id) {
            return Err(MarketplaceError::CourseNotFound);
        }
        {
            let mut reviews = self.reviews.lock().unwrap();
            if reviews
                .iter()
                .any(|r| r.user_id == review.user_id && r.course_id == review.course_id)
            {
                return Err(MarketplaceError::ReviewAlreadyExists);
            }
            reviews.push(review.clone());
        }
        Ok(self.recompute(&mut courses, review.course_id))
    }

    async fn update_rated(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
    ) -> Result<(Review, CourseRating), MarketplaceError> {
        let mut courses = self.courses.lock().unwrap();
        let updated = {
            let mut reviews = self.reviews.lock().unwrap();
            let review = reviews
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(MarketplaceError::ReviewNotFound)?;
            if let Some(rating) = patch.rating {
                review.rating = rating;
            }
            if let Some(comment) = &patch.comment {
                review.comment = Some(comment.clone());
            }
            review.updated_at = Utc::now();
            review.clone()
        };
        let rating = self.recompute(&mut courses, updated.course_id);
        Ok((updated, rating))
    }

    async fn delete_rated(&self, id: Uuid) -> Result<CourseRating, MarketplaceError> {
        let mut courses = self.courses.lock().unwrap();
        let course_id = {
            let mut reviews = self.reviews.lock().unwrap();
            let index = reviews
                .iter()
                .position(|r| r.id == id)
                .ok_or(MarketplaceError::ReviewNotFound)?;
            reviews.remove(index).course_id
        };
        Ok(self.recompute(&mut courses, course_id))
    }
}

// ── MockMedia ────────────────────────────────────────────────────────────────

/// Records uploads and answers with a deterministic URL.
#[derive(Clone, Default)]
pub struct MockMedia {
    pub uploads: Arc<Mutex<Vec<(String, String, ResourceType)>>>,
}

impl MockMedia {
    pub fn recorded(&self) -> Vec<(String, String, ResourceType)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl MediaStoragePort for MockMedia {
    async fn upload(
        &self,
        file: &StagedFile,
        folder: &str,
        resource_type: ResourceType,
    ) -> Result<String, MarketplaceError> {
        assert!(file.path.exists(), "staged file must exist during upload");
        self.uploads
            .lock()
            .unwrap()
            .push((file.file_name.clone(), folder.to_owned(), resource_type));
        Ok(format!("https://media.test/{folder}/{}", file.file_name))
    }
}

// ── MockPayments ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPayments {
    pub requests: Arc<Mutex<Vec<CheckoutRequest>>>,
}

impl MockPayments {
    pub fn recorded(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PaymentPort for MockPayments {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, MarketplaceError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let id = format!("cs_test_{}", requests.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.test/{id}"),
            id,
        })
    }
}
