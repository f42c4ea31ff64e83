use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use learnhub_domain::lecture::LectureKind;
use learnhub_domain::order::PaymentStatus;
use learnhub_domain::user::UserRole;

/// Picture assigned to accounts registered without one.
pub const DEFAULT_PROFILE_PICTURE: &str = "/uploads/default.jpeg";

/// Media folder for profile pictures and course images.
pub const IMAGE_FOLDER: &str = "lms-images";

/// Media folder for lecture content.
pub const CONTENT_FOLDER: &str = "lms-content";

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub profile_picture: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload. The role is decided by the repository inside the
/// same transaction that inserts the row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_picture: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.profile_picture.is_none()
    }
}

// ── Projections ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseBrief {
    pub id: Uuid,
    pub title: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRef {
    pub id: Uuid,
    pub user_id: Uuid,
}

// ── Categories ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDetail {
    pub category: Category,
    pub courses: Vec<CourseBrief>,
}

// ── Courses ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_paid: bool,
    pub image: String,
    pub average_rating: f64,
    pub number_of_reviews: i32,
    pub category_id: Uuid,
    pub instructor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetail {
    pub course: Course,
    pub category: Option<CategoryRef>,
    pub instructor: Option<InstructorRef>,
    pub sections: Vec<SectionRef>,
    pub orders: Vec<OrderRef>,
}

/// Rating fields of one course after a review write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseRating {
    pub course_id: Uuid,
    pub average_rating: f64,
    pub number_of_reviews: i32,
}

// ── Sections / lectures ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDetail {
    pub section: Section,
    pub course: Option<CourseRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lecture {
    pub id: Uuid,
    pub title: String,
    pub content: Vec<String>,
    pub kind: LectureKind,
    pub section_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureDetail {
    pub lecture: Lecture,
    pub section: Option<SectionRef>,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub price: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetail {
    pub order: Order,
    pub user: Option<UserRef>,
    pub course: Option<CourseRef>,
}

/// Hosted checkout to open for one course purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub product_name: String,
    pub product_description: Option<String>,
    /// Price in cents.
    pub unit_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Provider notification relevant to order state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub session_id: String,
    pub status: PaymentStatus,
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

// ── Media ────────────────────────────────────────────────────────────────────

/// How the media store should treat an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Auto,
    Video,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Video => "video",
        }
    }

    pub fn for_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            Self::Video
        } else {
            Self::Auto
        }
    }
}

/// A multipart file written to the upload directory.
///
/// The file is removed when the value is dropped, whether or not the upload
/// to the media store succeeded.
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}
