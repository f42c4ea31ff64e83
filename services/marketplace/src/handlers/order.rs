use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_auth_types::identity::Session;
use learnhub_domain::order::PaymentStatus;
use learnhub_domain::pagination::PageRequest;
use learnhub_domain::user::ORDER_VIEWERS;

use crate::domain::types::OrderDetail;
use crate::error::MarketplaceError;
use crate::handlers::course::{NamedRef, TitledRef};
use crate::handlers::{ApiJson, ApiQuery, path_id, require_role};
use crate::state::AppState;
use crate::usecase::order::{GetOrderUseCase, ListOrdersUseCase, PurchaseCourseUseCase};

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_session_id: String,
    pub user: Option<NamedRef>,
    pub course: Option<TitledRef>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "learnhub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        let order = detail.order;
        Self {
            id: order.id,
            user_id: order.user_id,
            course_id: order.course_id,
            price: order.price,
            payment_status: order.payment_status,
            payment_session_id: order.payment_session_id,
            user: detail.user.map(|u| NamedRef {
                id: u.id,
                name: u.name,
            }),
            course: detail.course.map(|c| TitledRef {
                id: c.id,
                title: c.title,
            }),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// ── POST /orders/create ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub course_id: Option<String>,
}

/// Hosted checkout the client should redirect to.
#[derive(Serialize)]
pub struct CheckoutResponse {
    pub id: String,
    pub url: String,
}

pub async fn purchase_course(
    session: Session,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), MarketplaceError> {
    let usecase = PurchaseCourseUseCase {
        orders: state.order_repo(),
        courses: state.course_repo(),
        payments: state.payments.clone(),
        success_url: state.success_url.clone(),
        public_base_url: state.public_base_url.clone(),
    };
    let (_, checkout) = usecase.execute(session.user_id, body.course_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            id: checkout.id,
            url: checkout.url,
        }),
    ))
}

// ── GET /orders ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
}

pub async fn list_orders(
    session: Session,
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<OrderListResponse>, MarketplaceError> {
    require_role(&session, ORDER_VIEWERS)?;
    let usecase = ListOrdersUseCase {
        repo: state.order_repo(),
    };
    let orders = usecase.execute(page).await?;
    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /orders/{id} ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrderEnvelope {
    pub order: OrderResponse,
}

pub async fn get_order(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderEnvelope>, MarketplaceError> {
    require_role(&session, ORDER_VIEWERS)?;
    let usecase = GetOrderUseCase {
        repo: state.order_repo(),
    };
    let detail = usecase.execute(path_id(&id)?).await?;
    Ok(Json(OrderEnvelope {
        order: detail.into(),
    }))
}
