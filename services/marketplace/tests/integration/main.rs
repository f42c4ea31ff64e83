mod auth_test;
mod helpers;
mod lecture_test;
mod order_test;
mod review_test;
mod router_test;
