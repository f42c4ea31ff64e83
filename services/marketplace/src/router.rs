use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use learnhub_core::health::{healthz, readyz};
use learnhub_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{login, logout, register},
    category::{
        create_category, delete_category, get_category, list_categories, update_category,
    },
    course::{create_course, delete_course, get_course, list_courses, update_course},
    lecture::{create_lecture, delete_lecture, get_lecture, list_lectures, update_lecture},
    order::{get_order, list_orders, purchase_course},
    payment::{payment_cancel, payment_success, payment_webhook},
    review::{create_review, delete_review, update_review},
    section::{create_section, delete_section, get_section, list_sections, update_section},
    user::{change_user_role, get_user, list_users, update_user, update_user_password},
};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        // Users
        .route("/users", get(list_users))
        .route("/users/updateUser", patch(update_user))
        .route("/users/updateUserPassword", patch(update_user_password))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/role", patch(change_user_role))
        // Categories
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        // Courses
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        // Sections
        .route("/sections", get(list_sections).post(create_section))
        .route(
            "/sections/{id}",
            get(get_section).patch(update_section).delete(delete_section),
        )
        // Lectures
        .route("/lectures", get(list_lectures).post(create_lecture))
        .route(
            "/lectures/{id}",
            get(get_lecture).patch(update_lecture).delete(delete_lecture),
        )
        // Orders
        .route("/orders", get(list_orders))
        .route("/orders/create", post(purchase_course))
        .route("/orders/{id}", get(get_order))
        // Reviews
        .route("/reviews", post(create_review))
        .route("/reviews/{id}", patch(update_review).delete(delete_review))
        // Payments
        .route("/payments/success", get(payment_success))
        .route("/payments/cancel", get(payment_cancel))
        .route("/payments/webhook", post(payment_webhook))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(body_limit),
        )
        .with_state(state)
}
