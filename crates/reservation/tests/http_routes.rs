mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::Harness;
use reservation::handler::AppRouter;
use serde_json::{Value, json};
use tower::ServiceExt;

const FARMER: i32 = 100;
const ALICE: i32 = 1;
const BOB: i32 = 2;

fn app(h: &Harness) -> Router {
    AppRouter::build(h.state.clone())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).expect("request")
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn create_reservation_returns_201() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;
    let token = h.token(ALICE.into());

    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/v1/reservations/create",
            Some(&token),
            Some(json!({ "productId": product, "quantity": 3 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Stock reserved successfully");
    assert_eq!(body["reservation"]["quantity"], 3);
    assert_eq!(body["reservation"]["status"], "active");
    assert_eq!(body["reservation"]["userId"], ALICE);
}

#[tokio::test]
async fn reservation_routes_require_a_token() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/v1/reservations/create",
            None,
            Some(json!({ "productId": product, "quantity": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        app(&h),
        request(
            Method::DELETE,
            &format!("/api/v1/reservations/cancel/{product}"),
            Some("not-a-jwt"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_request_is_400_with_available_stock() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(BOB, product, 6)
        .await
        .expect("bob");

    let (status, body) = send(
        app(&h),
        request(
            Method::PUT,
            &format!("/api/v1/reservations/update/{product}"),
            Some(&h.token(ALICE.into())),
            Some(json!({ "quantity": 5 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Only 4 units available");
    assert_eq!(body["availableStock"], 4);
}

#[tokio::test]
async fn zero_quantity_is_400() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    let (status, body) = send(
        app(&h),
        request(
            Method::PUT,
            &format!("/api/v1/reservations/update/{product}"),
            Some(&h.token(ALICE.into())),
            Some(json!({ "quantity": 0 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Quantity must be at least 1");
}

#[tokio::test]
async fn available_stock_is_public_and_personalised_with_token() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(ALICE, product, 3)
        .await
        .expect("alice");

    let uri = format!("/api/v1/reservations/available-stock/{product}");

    let (status, anonymous) = send(app(&h), request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        anonymous,
        json!({
            "success": true,
            "totalStock": 10,
            "availableStock": 7,
            "userReservation": 0
        })
    );

    let (status, own) = send(
        app(&h),
        request(Method::GET, &uri, Some(&h.token(ALICE.into())), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["availableStock"], 10);
    assert_eq!(own["userReservation"], 3);
}

#[tokio::test]
async fn available_stock_of_unknown_product_is_404() {
    let h = Harness::new();

    let (status, body) = send(
        app(&h),
        request(
            Method::GET,
            "/api/v1/reservations/available-stock/9999",
            None,
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn cancel_reports_404_when_nothing_is_held() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;
    let token = h.token(ALICE.into());
    let uri = format!("/api/v1/reservations/cancel/{product}");

    h.command()
        .upsert_reservation(ALICE, product, 1)
        .await
        .expect("reserve");

    let (status, body) = send(app(&h), request(Method::DELETE, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reservation cancelled successfully");

    let (status, body) = send(app(&h), request(Method::DELETE, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No active reservation found");
}

#[tokio::test]
async fn my_reservations_lists_callers_holds() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(ALICE, product, 2)
        .await
        .expect("alice");
    h.command()
        .upsert_reservation(BOB, product, 1)
        .await
        .expect("bob");

    let (status, body) = send(
        app(&h),
        request(
            Method::GET,
            "/api/v1/reservations/mine",
            Some(&h.token(ALICE.into())),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let list = body["reservations"].as_array().expect("array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["productId"], product);
}

#[tokio::test]
async fn cleanup_expired_reports_count() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(ALICE, product, 2)
        .await
        .expect("alice");
    h.command()
        .upsert_reservation(BOB, product, 2)
        .await
        .expect("bob");
    h.clock.advance(chrono::Duration::hours(25));

    let (status, body) = send(
        app(&h),
        request(Method::POST, "/api/v1/reservations/cleanup-expired", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "2 expired reservations cleaned up");
}

#[tokio::test]
async fn update_stock_is_limited_to_listing_farmer() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;
    let uri = format!("/api/v1/produce/update-stock/{product}");

    let (status, _) = send(
        app(&h),
        request(
            Method::PUT,
            &uri,
            Some(&h.token(ALICE.into())),
            Some(json!({ "quantity": 3 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(&h),
        request(
            Method::PUT,
            &uri,
            Some(&h.token(FARMER.into())),
            Some(json!({ "quantity": 3 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stock updated successfully");
    assert_eq!(body["produce"]["quantity"], 3);
}

#[tokio::test]
async fn health_and_metrics_are_served() {
    let h = Harness::new();

    let (status, body) = send(app(&h), request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let response = app(&h)
        .oneshot(request(Method::GET, "/metrics", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.contains("reservation_command_service_requests"));
}
