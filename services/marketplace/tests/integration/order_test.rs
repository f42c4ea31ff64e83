use rust_decimal::Decimal;
use uuid::Uuid;

use learnhub_domain::order::PaymentStatus;
use learnhub_domain::pagination::PageRequest;
use learnhub_marketplace::domain::repository::OrderRepository;
use learnhub_marketplace::domain::types::{Order, OrderDetail, PaymentEvent};
use learnhub_marketplace::error::MarketplaceError;
use learnhub_marketplace::usecase::order::{ApplyPaymentEventUseCase, PurchaseCourseUseCase};

use crate::helpers::{MockCourseRepo, MockOrderRepo, MockPayments, test_course, test_order};

fn purchase_usecase(
    orders: MockOrderRepo,
    courses: MockCourseRepo,
    payments: MockPayments,
) -> PurchaseCourseUseCase<MockOrderRepo, MockCourseRepo, MockPayments> {
    PurchaseCourseUseCase {
        orders,
        courses,
        payments,
        success_url: "https://learnhub.test/success".into(),
        public_base_url: "https://api.learnhub.test/".into(),
    }
}

#[tokio::test]
async fn should_open_checkout_and_record_pending_order() {
    let course = test_course(Uuid::now_v7(), Uuid::now_v7(), Decimal::new(1999, 2));
    let orders = MockOrderRepo::default();
    let payments = MockPayments::default();
    let uc = purchase_usecase(
        orders.clone(),
        MockCourseRepo::new(vec![course.clone()]),
        payments.clone(),
    );
    let student = Uuid::now_v7();

    let (order, session) = uc.execute(student, Some(course.id.to_string())).await.unwrap();

    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.payment_session_id, session.id);
    assert_eq!(order.price, course.price);
    assert_eq!(orders.snapshot(), vec![order]);

    let requests = payments.recorded();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.unit_amount, 1999);
    assert_eq!(request.course_id, course.id);
    assert_eq!(request.student_id, student);
    assert_eq!(request.product_name, course.title);
    assert_eq!(
        request.success_url,
        "https://learnhub.test/success?session_id={CHECKOUT_SESSION_ID}"
    );
    assert_eq!(
        request.cancel_url,
        "https://api.learnhub.test/api/v1/payments/cancel"
    );
}

#[tokio::test]
async fn should_reject_purchase_of_owned_course() {
    let course = test_course(Uuid::now_v7(), Uuid::now_v7(), Decimal::new(10, 0));
    let student = Uuid::now_v7();
    let owned = test_order(student, course.id, PaymentStatus::Completed);
    let payments = MockPayments::default();
    let uc = purchase_usecase(
        MockOrderRepo::new(vec![owned]),
        MockCourseRepo::new(vec![course.clone()]),
        payments.clone(),
    );

    let result = uc.execute(student, Some(course.id.to_string())).await;

    assert!(
        matches!(result, Err(MarketplaceError::CourseAlreadyOwned)),
        "expected CourseAlreadyOwned, got {result:?}"
    );
    assert!(payments.recorded().is_empty(), "no checkout should be opened");
}

#[tokio::test]
async fn should_allow_retry_after_pending_order() {
    let course = test_course(Uuid::now_v7(), Uuid::now_v7(), Decimal::new(10, 0));
    let student = Uuid::now_v7();
    let pending = test_order(student, course.id, PaymentStatus::Pending);
    let orders = MockOrderRepo::new(vec![pending]);
    let uc = purchase_usecase(
        orders.clone(),
        MockCourseRepo::new(vec![course.clone()]),
        MockPayments::default(),
    );

    uc.execute(student, Some(course.id.to_string())).await.unwrap();

    assert_eq!(orders.snapshot().len(), 2);
}

#[tokio::test]
async fn should_reject_purchase_of_unknown_course() {
    let uc = purchase_usecase(
        MockOrderRepo::default(),
        MockCourseRepo::default(),
        MockPayments::default(),
    );

    let result = uc.execute(Uuid::now_v7(), Some(Uuid::now_v7().to_string())).await;

    assert!(matches!(result, Err(MarketplaceError::CourseNotFound)));
}

#[tokio::test]
async fn should_complete_order_from_payment_event() {
    let order = test_order(Uuid::now_v7(), Uuid::now_v7(), PaymentStatus::Pending);
    let repo = MockOrderRepo::new(vec![order.clone()]);
    let uc = ApplyPaymentEventUseCase { repo: repo.clone() };

    let changed = uc
        .execute(&PaymentEvent {
            session_id: order.payment_session_id.clone(),
            status: PaymentStatus::Completed,
        })
        .await
        .unwrap();

    assert_eq!(changed, Some(PaymentStatus::Completed));
    assert_eq!(repo.snapshot()[0].payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn should_ignore_event_for_unknown_session() {
    let repo = MockOrderRepo::default();
    let uc = ApplyPaymentEventUseCase { repo };

    let changed = uc
        .execute(&PaymentEvent {
            session_id: "cs_test_missing".into(),
            status: PaymentStatus::Completed,
        })
        .await
        .unwrap();

    assert_eq!(changed, None);
}

#[tokio::test]
async fn should_never_downgrade_completed_order() {
    let order = test_order(Uuid::now_v7(), Uuid::now_v7(), PaymentStatus::Completed);
    let repo = MockOrderRepo::new(vec![order.clone()]);
    let uc = ApplyPaymentEventUseCase { repo: repo.clone() };

    let changed = uc
        .execute(&PaymentEvent {
            session_id: order.payment_session_id.clone(),
            status: PaymentStatus::Failed,
        })
        .await
        .unwrap();

    assert_eq!(changed, None);
    assert_eq!(repo.snapshot()[0].payment_status, PaymentStatus::Completed);
}

/// Serves a fixed snapshot of the order while writes go to the live store,
/// like a webhook that read the order just before a sibling completed it.
#[derive(Clone)]
struct StaleReadOrders {
    live: MockOrderRepo,
    seen: Order,
}

impl OrderRepository for StaleReadOrders {
    async fn find_completed(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Order>, MarketplaceError> {
        self.live.find_completed(user_id, course_id).await
    }

    async fn find_by_session_id(
        &self,
        _session_id: &str,
    ) -> Result<Option<Order>, MarketplaceError> {
        Ok(Some(self.seen.clone()))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<OrderDetail>, MarketplaceError> {
        self.live.find_detail(id).await
    }

    async fn list_details(
        &self,
        page: PageRequest,
    ) -> Result<Vec<OrderDetail>, MarketplaceError> {
        self.live.list_details(page).await
    }

    async fn create(&self, order: &Order) -> Result<(), MarketplaceError> {
        self.live.create(order).await
    }

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool, MarketplaceError> {
        self.live.set_status(id, status).await
    }
}

#[tokio::test]
async fn should_keep_order_completed_by_concurrent_event() {
    let pending = test_order(Uuid::now_v7(), Uuid::now_v7(), PaymentStatus::Pending);
    let mut completed = pending.clone();
    completed.payment_status = PaymentStatus::Completed;
    let live = MockOrderRepo::new(vec![completed]);
    let uc = ApplyPaymentEventUseCase {
        repo: StaleReadOrders {
            live: live.clone(),
            seen: pending.clone(),
        },
    };

    let changed = uc
        .execute(&PaymentEvent {
            session_id: pending.payment_session_id.clone(),
            status: PaymentStatus::Failed,
        })
        .await
        .unwrap();

    assert_eq!(changed, None);
    assert_eq!(live.snapshot()[0].payment_status, PaymentStatus::Completed);
}
