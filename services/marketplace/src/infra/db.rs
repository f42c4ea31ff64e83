use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use learnhub_domain::order::PaymentStatus;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::review::RatingAggregate;
use learnhub_domain::user::UserRole;
use learnhub_marketplace_schema::{categories, courses, lectures, orders, reviews, sections, users};

use crate::domain::repository::{
    CategoryRepository, CourseRepository, LectureRepository, OrderRepository, ReviewRepository,
    SectionRepository, UserRepository,
};
use crate::domain::types::{
    Category, CategoryDetail, CategoryRef, Course, CourseBrief, CourseDetail, CourseRating,
    CourseRef, InstructorRef, Lecture, LectureDetail, NewUser, Order, OrderDetail, OrderRef,
    Review, ReviewPatch, Section, SectionDetail, SectionRef, User, UserPatch, UserRef,
};
use crate::error::MarketplaceError;

/// Serializes first-user detection across concurrent registrations.
const REGISTRATION_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext('learnhub.register'))";

fn internal(err: DbErr, context: &'static str) -> MarketplaceError {
    MarketplaceError::Internal(anyhow::Error::new(err).context(context))
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

fn from_transaction(err: TransactionError<MarketplaceError>, context: &'static str) -> MarketplaceError {
    match err {
        TransactionError::Connection(e) => internal(e, context),
        TransactionError::Transaction(e) => e,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, MarketplaceError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn register(&self, user: &NewUser) -> Result<User, MarketplaceError> {
        let user = user.clone();
        let model = self
            .db
            .transaction::<_, users::Model, MarketplaceError>(|txn| {
                Box::pin(async move {
                    txn.execute_unprepared(REGISTRATION_LOCK_SQL)
                        .await
                        .context("take registration lock")?;

                    let taken = users::Entity::find()
                        .filter(users::Column::Email.eq(user.email.as_str()))
                        .one(txn)
                        .await
                        .context("check email")?;
                    if taken.is_some() {
                        return Err(MarketplaceError::EmailTaken);
                    }

                    let existing = users::Entity::find()
                        .count(txn)
                        .await
                        .context("count users")?;
                    let role = UserRole::for_registration(existing);

                    users::ActiveModel {
                        id: Set(user.id),
                        name: Set(user.name),
                        email: Set(user.email),
                        password_hash: Set(user.password_hash),
                        role: Set(role.as_str().to_owned()),
                        bio: Set(user.bio),
                        profile_picture: Set(user.profile_picture),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.created_at),
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            MarketplaceError::EmailTaken
                        } else {
                            internal(e, "insert user")
                        }
                    })
                })
            })
            .await
            .map_err(|e| from_transaction(e, "register user"))?;
        Ok(user_from_model(model)?)
    }

    async fn update_profile(&self, id: Uuid, patch: &UserPatch) -> Result<User, MarketplaceError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(email) = &patch.email {
            am.email = Set(email.clone());
        }
        if let Some(bio) = &patch.bio {
            am.bio = Set(Some(bio.clone()));
        }
        if let Some(picture) = &patch.profile_picture {
            am.profile_picture = Set(picture.clone());
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => MarketplaceError::UserNotFound,
            e if is_unique_violation(&e) => MarketplaceError::EmailTaken,
            e => internal(e, "update user profile"),
        })?;
        Ok(user_from_model(model)?)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), MarketplaceError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => MarketplaceError::UserNotFound,
            e => internal(e, "update user password"),
        })?;
        Ok(())
    }

    async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<User>, MarketplaceError> {
        let result = users::ActiveModel {
            id: Set(id),
            role: Set(role.as_str().to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await;
        match result {
            Ok(model) => Ok(Some(user_from_model(model)?)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(internal(e, "update user role")),
        }
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    let role = model
        .role
        .parse::<UserRole>()
        .with_context(|| format!("stored role of user {}", model.id))?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        bio: model.bio,
        profile_picture: model.profile_picture,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketplaceError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<CategoryDetail>, MarketplaceError> {
        let Some(model) = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?
        else {
            return Ok(None);
        };
        let courses = model
            .find_related(courses::Entity)
            .order_by_asc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("load category courses")?;
        Ok(Some(CategoryDetail {
            category: category_from_model(model),
            courses: courses.into_iter().map(course_brief).collect(),
        }))
    }

    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<CategoryDetail>, MarketplaceError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list categories")?;
        let courses = models
            .load_many(courses::Entity, &self.db)
            .await
            .context("load category courses")?;
        Ok(models
            .into_iter()
            .zip(courses)
            .map(|(model, courses)| CategoryDetail {
                category: category_from_model(model),
                courses: courses.into_iter().map(course_brief).collect(),
            })
            .collect())
    }

    async fn create(&self, category: &Category) -> Result<(), MarketplaceError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                MarketplaceError::CategoryNameTaken
            } else {
                internal(e, "create category")
            }
        })?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), MarketplaceError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            updated_at: Set(category.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => MarketplaceError::CategoryNotFound,
            e if is_unique_violation(&e) => MarketplaceError::CategoryNameTaken,
            e => internal(e, "update category"),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    MarketplaceError::CategoryInUse
                } else {
                    internal(e, "delete category")
                }
            })?;
        Ok(result.rows_affected > 0)
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn course_brief(model: courses::Model) -> CourseBrief {
    CourseBrief {
        id: model.id,
        title: model.title,
        price: model.price,
    }
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

impl CourseRepository for DbCourseRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, MarketplaceError> {
        let model = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find course by id")?;
        Ok(model.map(course_from_model))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<CourseDetail>, MarketplaceError> {
        let Some(model) = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find course by id")?
        else {
            return Ok(None);
        };
        let category = model
            .find_related(categories::Entity)
            .one(&self.db)
            .await
            .context("load course category")?;
        let instructor = model
            .find_related(users::Entity)
            .one(&self.db)
            .await
            .context("load course instructor")?;
        let sections = model
            .find_related(sections::Entity)
            .order_by_asc(sections::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("load course sections")?;
        let orders = model
            .find_related(orders::Entity)
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("load course orders")?;
        Ok(Some(course_detail(model, category, instructor, sections, orders)))
    }

    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<CourseDetail>, MarketplaceError> {
        let models = courses::Entity::find()
            .order_by_desc(courses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list courses")?;
        let categories = models
            .load_one(categories::Entity, &self.db)
            .await
            .context("load course categories")?;
        let instructors = models
            .load_one(users::Entity, &self.db)
            .await
            .context("load course instructors")?;
        let sections = models
            .load_many(sections::Entity, &self.db)
            .await
            .context("load course sections")?;
        let orders = models
            .load_many(orders::Entity, &self.db)
            .await
            .context("load course orders")?;

        Ok(models
            .into_iter()
            .zip(categories)
            .zip(instructors)
            .zip(sections)
            .zip(orders)
            .map(|((((model, category), instructor), sections), orders)| {
                course_detail(model, category, instructor, sections, orders)
            })
            .collect())
    }

    async fn create(&self, course: &Course) -> Result<(), MarketplaceError> {
        courses::ActiveModel {
            id: Set(course.id),
            title: Set(course.title.clone()),
            description: Set(course.description.clone()),
            price: Set(course.price),
            is_paid: Set(course.is_paid),
            image: Set(course.image.clone()),
            average_rating: Set(course.average_rating),
            number_of_reviews: Set(course.number_of_reviews),
            category_id: Set(course.category_id),
            instructor_id: Set(course.instructor_id),
            created_at: Set(course.created_at),
            updated_at: Set(course.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                MarketplaceError::CategoryNotFound
            } else {
                internal(e, "create course")
            }
        })?;
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), MarketplaceError> {
        courses::ActiveModel {
            id: Set(course.id),
            title: Set(course.title.clone()),
            description: Set(course.description.clone()),
            price: Set(course.price),
            is_paid: Set(course.is_paid),
            image: Set(course.image.clone()),
            category_id: Set(course.category_id),
            updated_at: Set(course.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => MarketplaceError::CourseNotFound,
            e if is_foreign_key_violation(&e) => MarketplaceError::CategoryNotFound,
            e => internal(e, "update course"),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = courses::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete course")?;
        Ok(result.rows_affected > 0)
    }
}

fn course_from_model(model: courses::Model) -> Course {
    Course {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
        is_paid: model.is_paid,
        image: model.image,
        average_rating: model.average_rating,
        number_of_reviews: model.number_of_reviews,
        category_id: model.category_id,
        instructor_id: model.instructor_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn course_detail(
    model: courses::Model,
    category: Option<categories::Model>,
    instructor: Option<users::Model>,
    sections: Vec<sections::Model>,
    orders: Vec<orders::Model>,
) -> CourseDetail {
    CourseDetail {
        course: course_from_model(model),
        category: category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
        }),
        instructor: instructor.map(|u| InstructorRef {
            id: u.id,
            name: u.name,
            email: u.email,
        }),
        sections: sections
            .into_iter()
            .map(|s| SectionRef {
                id: s.id,
                title: s.title,
            })
            .collect(),
        orders: orders
            .into_iter()
            .map(|o| OrderRef {
                id: o.id,
                user_id: o.user_id,
            })
            .collect(),
    }
}

// ── Section repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSectionRepository {
    pub db: DatabaseConnection,
}

impl SectionRepository for DbSectionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Section>, MarketplaceError> {
        let model = sections::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find section by id")?;
        Ok(model.map(section_from_model))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<SectionDetail>, MarketplaceError> {
        let Some(model) = sections::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find section by id")?
        else {
            return Ok(None);
        };
        let course = model
            .find_related(courses::Entity)
            .one(&self.db)
            .await
            .context("load section course")?;
        Ok(Some(SectionDetail {
            section: section_from_model(model),
            course: course.map(course_ref),
        }))
    }

    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<SectionDetail>, MarketplaceError> {
        let models = sections::Entity::find()
            .order_by_asc(sections::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list sections")?;
        let courses = models
            .load_one(courses::Entity, &self.db)
            .await
            .context("load section courses")?;
        Ok(models
            .into_iter()
            .zip(courses)
            .map(|(model, course)| SectionDetail {
                section: section_from_model(model),
                course: course.map(course_ref),
            })
            .collect())
    }

    async fn create(&self, section: &Section) -> Result<(), MarketplaceError> {
        sections::ActiveModel {
            id: Set(section.id),
            title: Set(section.title.clone()),
            description: Set(section.description.clone()),
            course_id: Set(section.course_id),
            created_at: Set(section.created_at),
            updated_at: Set(section.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                MarketplaceError::CourseNotFound
            } else {
                internal(e, "create section")
            }
        })?;
        Ok(())
    }

    async fn update(&self, section: &Section) -> Result<(), MarketplaceError> {
        sections::ActiveModel {
            id: Set(section.id),
            title: Set(section.title.clone()),
            description: Set(section.description.clone()),
            course_id: Set(section.course_id),
            updated_at: Set(section.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => MarketplaceError::SectionNotFound,
            e if is_foreign_key_violation(&e) => MarketplaceError::CourseNotFound,
            e => internal(e, "update section"),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = sections::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete section")?;
        Ok(result.rows_affected > 0)
    }
}

fn section_from_model(model: sections::Model) -> Section {
    Section {
        id: model.id,
        title: model.title,
        description: model.description,
        course_id: model.course_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn course_ref(model: courses::Model) -> CourseRef {
    CourseRef {
        id: model.id,
        title: model.title,
    }
}

// ── Lecture repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLectureRepository {
    pub db: DatabaseConnection,
}

impl LectureRepository for DbLectureRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lecture>, MarketplaceError> {
        let model = lectures::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find lecture by id")?;
        Ok(model.map(lecture_from_model).transpose()?)
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<LectureDetail>, MarketplaceError> {
        let Some(model) = lectures::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find lecture by id")?
        else {
            return Ok(None);
        };
        let section = model
            .find_related(sections::Entity)
            .one(&self.db)
            .await
            .context("load lecture section")?;
        Ok(Some(LectureDetail {
            lecture: lecture_from_model(model)?,
            section: section.map(section_ref),
        }))
    }

    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<LectureDetail>, MarketplaceError> {
        let models = lectures::Entity::find()
            .order_by_asc(lectures::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list lectures")?;
        let sections = models
            .load_one(sections::Entity, &self.db)
            .await
            .context("load lecture sections")?;
        let mut details = Vec::with_capacity(models.len());
        for (model, section) in models.into_iter().zip(sections) {
            details.push(LectureDetail {
                lecture: lecture_from_model(model)?,
                section: section.map(section_ref),
            });
        }
        Ok(details)
    }

    async fn create(&self, lecture: &Lecture) -> Result<(), MarketplaceError> {
        lectures::ActiveModel {
            id: Set(lecture.id),
            title: Set(lecture.title.clone()),
            content: Set(serde_json::to_value(&lecture.content).context("encode lecture content")?),
            kind: Set(lecture.kind.as_str().to_owned()),
            section_id: Set(lecture.section_id),
            created_at: Set(lecture.created_at),
            updated_at: Set(lecture.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                MarketplaceError::SectionNotFound
            } else {
                internal(e, "create lecture")
            }
        })?;
        Ok(())
    }

    async fn update(&self, lecture: &Lecture) -> Result<(), MarketplaceError> {
        lectures::ActiveModel {
            id: Set(lecture.id),
            title: Set(lecture.title.clone()),
            content: Set(serde_json::to_value(&lecture.content).context("encode lecture content")?),
            kind: Set(lecture.kind.as_str().to_owned()),
            section_id: Set(lecture.section_id),
            updated_at: Set(lecture.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => MarketplaceError::LectureNotFound,
            e if is_foreign_key_violation(&e) => MarketplaceError::SectionNotFound,
            e => internal(e, "update lecture"),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = lectures::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete lecture")?;
        Ok(result.rows_affected > 0)
    }
}

fn lecture_from_model(model: lectures::Model) -> anyhow::Result<Lecture> {
    let content: Vec<String> = serde_json::from_value(model.content)
        .with_context(|| format!("stored content of lecture {}", model.id))?;
    let kind = model
        .kind
        .parse()
        .with_context(|| format!("stored kind of lecture {}", model.id))?;
    Ok(Lecture {
        id: model.id,
        title: model.title,
        content,
        kind,
        section_id: model.section_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn section_ref(model: sections::Model) -> SectionRef {
    SectionRef {
        id: model.id,
        title: model.title,
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn find_completed(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Order>, MarketplaceError> {
        let model = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::CourseId.eq(course_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Completed.as_str()))
            .one(&self.db)
            .await
            .context("find completed order")?;
        Ok(model.map(order_from_model).transpose()?)
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, MarketplaceError> {
        let model = orders::Entity::find()
            .filter(orders::Column::PaymentSessionId.eq(session_id))
            .one(&self.db)
            .await
            .context("find order by payment session")?;
        Ok(model.map(order_from_model).transpose()?)
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, MarketplaceError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        let user = model
            .find_related(users::Entity)
            .one(&self.db)
            .await
            .context("load order user")?;
        let course = model
            .find_related(courses::Entity)
            .one(&self.db)
            .await
            .context("load order course")?;
        Ok(Some(OrderDetail {
            order: order_from_model(model)?,
            user: user.map(user_ref),
            course: course.map(course_ref),
        }))
    }

    async fn list_details(&self, page: PageRequest) -> Result<Vec<OrderDetail>, MarketplaceError> {
        let models = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list orders")?;
        let users = models
            .load_one(users::Entity, &self.db)
            .await
            .context("load order users")?;
        let courses = models
            .load_one(courses::Entity, &self.db)
            .await
            .context("load order courses")?;
        let mut details = Vec::with_capacity(models.len());
        for ((model, user), course) in models.into_iter().zip(users).zip(courses) {
            details.push(OrderDetail {
                order: order_from_model(model)?,
                user: user.map(user_ref),
                course: course.map(course_ref),
            });
        }
        Ok(details)
    }

    async fn create(&self, order: &Order) -> Result<(), MarketplaceError> {
        orders::ActiveModel {
            id: Set(order.id),
            user_id: Set(order.user_id),
            course_id: Set(order.course_id),
            price: Set(order.price),
            payment_status: Set(order.payment_status.as_str().to_owned()),
            payment_session_id: Set(order.payment_session_id.clone()),
            created_at: Set(order.created_at),
            updated_at: Set(order.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create order")?;
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool, MarketplaceError> {
        // The guard lives in the UPDATE so a concurrent completion wins.
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::PaymentStatus, Expr::value(status.as_str()))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::PaymentStatus.ne(PaymentStatus::Completed.as_str()))
            .exec(&self.db)
            .await
            .context("update order status")?;
        Ok(result.rows_affected > 0)
    }
}

fn order_from_model(model: orders::Model) -> anyhow::Result<Order> {
    let payment_status = model
        .payment_status
        .parse()
        .with_context(|| format!("stored payment status of order {}", model.id))?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        course_id: model.course_id,
        price: model.price,
        payment_status,
        payment_session_id: model.payment_session_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn user_ref(model: users::Model) -> UserRef {
    UserRef {
        id: model.id,
        name: model.name,
    }
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, MarketplaceError> {
        let model = reviews::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find review by id")?;
        Ok(model.map(review_from_model))
    }

    async fn create_rated(&self, review: &Review) -> Result<CourseRating, MarketplaceError> {
        let review = review.clone();
        self.db
            .transaction::<_, CourseRating, MarketplaceError>(|txn| {
                Box::pin(async move {
                    if !lock_course(txn, review.course_id).await? {
                        return Err(MarketplaceError::CourseNotFound);
                    }

                    let duplicate = reviews::Entity::find()
                        .filter(reviews::Column::UserId.eq(review.user_id))
                        .filter(reviews::Column::CourseId.eq(review.course_id))
                        .one(txn)
                        .await
                        .context("check existing review")?;
                    if duplicate.is_some() {
                        return Err(MarketplaceError::ReviewAlreadyExists);
                    }

                    reviews::ActiveModel {
                        id: Set(review.id),
                        user_id: Set(review.user_id),
                        course_id: Set(review.course_id),
                        rating: Set(review.rating),
                        comment: Set(review.comment),
                        created_at: Set(review.created_at),
                        updated_at: Set(review.updated_at),
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            MarketplaceError::ReviewAlreadyExists
                        } else {
                            internal(e, "insert review")
                        }
                    })?;

                    refresh_rating(txn, review.course_id).await
                })
            })
            .await
            .map_err(|e| from_transaction(e, "create review"))
    }

    async fn update_rated(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
    ) -> Result<(Review, CourseRating), MarketplaceError> {
        let patch = patch.clone();
        self.db
            .transaction::<_, (Review, CourseRating), MarketplaceError>(|txn| {
                Box::pin(async move {
                    let course_id = locked_review_course(txn, id).await?;

                    let mut am = reviews::ActiveModel {
                        id: Set(id),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    };
                    if let Some(rating) = patch.rating {
                        am.rating = Set(rating);
                    }
                    if let Some(comment) = patch.comment {
                        am.comment = Set(Some(comment));
                    }
                    let model = am.update(txn).await.map_err(|e| match e {
                        DbErr::RecordNotUpdated => MarketplaceError::ReviewNotFound,
                        e => internal(e, "update review"),
                    })?;

                    let rating = refresh_rating(txn, course_id).await?;
                    Ok((review_from_model(model), rating))
                })
            })
            .await
            .map_err(|e| from_transaction(e, "update review"))
    }

    async fn delete_rated(&self, id: Uuid) -> Result<CourseRating, MarketplaceError> {
        self.db
            .transaction::<_, CourseRating, MarketplaceError>(|txn| {
                Box::pin(async move {
                    let course_id = locked_review_course(txn, id).await?;

                    let result = reviews::Entity::delete_by_id(id)
                        .exec(txn)
                        .await
                        .context("delete review")?;
                    if result.rows_affected == 0 {
                        return Err(MarketplaceError::ReviewNotFound);
                    }

                    refresh_rating(txn, course_id).await
                })
            })
            .await
            .map_err(|e| from_transaction(e, "delete review"))
    }
}

/// `SELECT … FOR UPDATE` on the course row. Review writes for one course
/// queue up behind this lock. Returns `false` when the course is gone.
async fn lock_course(txn: &DatabaseTransaction, course_id: Uuid) -> Result<bool, MarketplaceError> {
    let course = courses::Entity::find_by_id(course_id)
        .lock_exclusive()
        .one(txn)
        .await
        .context("lock course")?;
    Ok(course.is_some())
}

/// Lock the course a review belongs to, then confirm the review survived
/// until the lock was granted. Returns the course id.
async fn locked_review_course(
    txn: &DatabaseTransaction,
    review_id: Uuid,
) -> Result<Uuid, MarketplaceError> {
    let review = reviews::Entity::find_by_id(review_id)
        .one(txn)
        .await
        .context("find review")?
        .ok_or(MarketplaceError::ReviewNotFound)?;
    lock_course(txn, review.course_id).await?;
    let still_there = reviews::Entity::find_by_id(review_id)
        .one(txn)
        .await
        .context("recheck review")?;
    match still_there {
        Some(_) => Ok(review.course_id),
        None => Err(MarketplaceError::ReviewNotFound),
    }
}

/// Recompute the course's rating aggregate from the reviews visible inside
/// the transaction and store it on the course.
async fn refresh_rating(
    txn: &DatabaseTransaction,
    course_id: Uuid,
) -> Result<CourseRating, MarketplaceError> {
    let ratings: Vec<i16> = reviews::Entity::find()
        .select_only()
        .column(reviews::Column::Rating)
        .filter(reviews::Column::CourseId.eq(course_id))
        .into_tuple()
        .all(txn)
        .await
        .context("load course ratings")?;
    let aggregate = RatingAggregate::from_ratings(&ratings);

    courses::ActiveModel {
        id: Set(course_id),
        average_rating: Set(aggregate.average_rating),
        number_of_reviews: Set(aggregate.number_of_reviews),
        ..Default::default()
    }
    .update(txn)
    .await
    .map_err(|e| match e {
        DbErr::RecordNotUpdated => MarketplaceError::CourseNotFound,
        e => internal(e, "store course rating"),
    })?;

    Ok(CourseRating {
        course_id,
        average_rating: aggregate.average_rating,
        number_of_reviews: aggregate.number_of_reviews,
    })
}

fn review_from_model(model: reviews::Model) -> Review {
    Review {
        id: model.id,
        user_id: model.user_id,
        course_id: model.course_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
