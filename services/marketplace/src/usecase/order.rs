use anyhow::anyhow;
use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::course::minor_units;
use learnhub_domain::order::PaymentStatus;
use learnhub_domain::pagination::PageRequest;

use crate::domain::repository::{CourseRepository, OrderRepository, PaymentPort};
use crate::domain::types::{CheckoutRequest, CheckoutSession, Order, OrderDetail, PaymentEvent};
use crate::error::MarketplaceError;
use crate::usecase::required_id;

// ── PurchaseCourse ───────────────────────────────────────────────────────────

pub struct PurchaseCourseUseCase<O: OrderRepository, C: CourseRepository, P: PaymentPort> {
    pub orders: O,
    pub courses: C,
    pub payments: P,
    /// Frontend page the provider redirects to after payment.
    pub success_url: String,
    /// Externally reachable base URL of this service.
    pub public_base_url: String,
}

impl<O, C, P> PurchaseCourseUseCase<O, C, P>
where
    O: OrderRepository,
    C: CourseRepository,
    P: PaymentPort,
{
    pub async fn execute(
        &self,
        student_id: Uuid,
        course_id: Option<String>,
    ) -> Result<(Order, CheckoutSession), MarketplaceError> {
        let course_id = required_id(course_id, "courseId")?;
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(MarketplaceError::CourseNotFound)?;

        if self
            .orders
            .find_completed(student_id, course_id)
            .await?
            .is_some()
        {
            return Err(MarketplaceError::CourseAlreadyOwned);
        }

        let unit_amount = minor_units(course.price)
            .ok_or_else(|| anyhow!("price {} does not fit in cents", course.price))?;
        let session = self
            .payments
            .create_checkout_session(&CheckoutRequest {
                course_id,
                student_id,
                product_name: course.title.clone(),
                product_description: course.description.clone(),
                unit_amount,
                success_url: format!("{}?session_id={{CHECKOUT_SESSION_ID}}", self.success_url),
                cancel_url: format!(
                    "{}/api/v1/payments/cancel",
                    self.public_base_url.trim_end_matches('/')
                ),
            })
            .await?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::now_v7(),
            user_id: student_id,
            course_id,
            price: course.price,
            payment_status: PaymentStatus::Pending,
            payment_session_id: session.id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.orders.create(&order).await?;
        tracing::info!(order_id = %order.id, %course_id, %student_id, "opened checkout");
        Ok((order, session))
    }
}

// ── ListOrders / GetOrder ────────────────────────────────────────────────────

pub struct ListOrdersUseCase<R: OrderRepository> {
    pub repo: R,
}

impl<R: OrderRepository> ListOrdersUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<OrderDetail>, MarketplaceError> {
        self.repo.list_details(page.clamped()).await
    }
}

pub struct GetOrderUseCase<R: OrderRepository> {
    pub repo: R,
}

impl<R: OrderRepository> GetOrderUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<OrderDetail, MarketplaceError> {
        self.repo
            .find_detail(id)
            .await?
            .ok_or(MarketplaceError::OrderNotFound)
    }
}

// ── ApplyPaymentEvent ────────────────────────────────────────────────────────

pub struct ApplyPaymentEventUseCase<R: OrderRepository> {
    pub repo: R,
}

impl<R: OrderRepository> ApplyPaymentEventUseCase<R> {
    /// Move the order behind the checkout session to the notified state.
    /// Returns the new status, or `None` when nothing changed.
    pub async fn execute(
        &self,
        event: &PaymentEvent,
    ) -> Result<Option<PaymentStatus>, MarketplaceError> {
        let Some(order) = self.repo.find_by_session_id(&event.session_id).await? else {
            tracing::warn!(session_id = %event.session_id, "payment event for unknown session");
            return Ok(None);
        };
        if !order.payment_status.can_transition_to(event.status) {
            return Ok(None);
        }
        if !self.repo.set_status(order.id, event.status).await? {
            tracing::debug!(order_id = %order.id, "order completed concurrently, event ignored");
            return Ok(None);
        }
        tracing::info!(
            order_id = %order.id,
            from = %order.payment_status,
            to = %event.status,
            "order payment status changed"
        );
        Ok(Some(event.status))
    }
}
