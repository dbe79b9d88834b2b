//! HTTP-level tests for the order endpoints, driven through the router with
//! `tower::ServiceExt::oneshot` and a mock database per scenario.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{json, Value};
use tower::ServiceExt;

use storefront_backend::handlers;

use crate::common::{
    app_model, budget_model, line_item_model, order_model, product_model, test_state,
    token_for_user,
};

fn order_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/orders", post(handlers::orders::place_order))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .with_state(test_state(db))
}

fn place_order_body() -> Value {
    json!({
        "firstname": "Ada",
        "lastname": "Lovelace",
        "email": "ada@example.com",
        "delivery_type": "home",
        "app_id": 1,
        "cart_items": [
            {"product_id": 10, "quantity": 2},
            {"product_id": 11, "quantity": 1}
        ]
    })
}

fn post_orders(body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn decimal_field(json: &Value, field: &str) -> Decimal {
    json[field]
        .as_str()
        .unwrap_or_else(|| panic!("{} missing: {}", field, json))
        .parse()
        .unwrap()
}

#[tokio::test]
async fn place_order_requires_authentication() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = order_router(db);

    let response = app.oneshot(post_orders(&place_order_body(), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn place_order_rejects_missing_fields() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = order_router(db);

    let mut body = place_order_body();
    body["firstname"] = json!("");
    let token = token_for_user(7, "ada@example.com", false);

    let response = app.oneshot(post_orders(&body, Some(&token))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Bad request");
    assert!(
        json["message"].as_str().unwrap().contains("firstname"),
        "message must name the missing field: {}",
        json
    );
}

#[tokio::test]
async fn place_order_returns_created_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([
            vec![product_model(10, 1, "X", dec!(30.00))],
            vec![product_model(11, 1, "Y", dec!(25.00))],
        ])
        .append_query_results([vec![budget_model(1, 7, 1, dec!(100.00))]])
        .append_query_results([vec![order_model(50, 7, 1)]])
        .append_query_results([
            vec![line_item_model(500, 50, 10, 2, dec!(30.00))],
            vec![line_item_model(501, 50, 11, 1, dec!(25.00))],
        ])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = order_router(db);
    let token = token_for_user(7, "ada@example.com", false);

    let response = app
        .oneshot(post_orders(&place_order_body(), Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_json(response).await;
    assert_eq!(json["id"], 50);
    assert_eq!(json["full_name"], "Ada Lovelace");
    assert_eq!(json["delivery_type"], "home");
    assert_eq!(json["delivery_location"], "Home delivery");
    assert_eq!(decimal_field(&json, "total"), dec!(85.00));

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product"]["id"], 10);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(decimal_field(&items[0], "unit_price"), dec!(30.00));
    assert_eq!(decimal_field(&items[0], "total_price"), dec!(60.00));
}

#[tokio::test]
async fn place_order_forbidden_for_non_member() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 999)]])
        .append_query_results([Vec::<storefront_backend::entities::app_users::Model>::new()])
        .into_connection();
    let app = order_router(db);
    let token = token_for_user(7, "ada@example.com", false);

    let response = app
        .oneshot(post_orders(&place_order_body(), Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Forbidden");
}

#[tokio::test]
async fn place_order_reports_budget_shortfall() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([
            vec![product_model(10, 1, "X", dec!(30.00))],
            vec![product_model(11, 1, "Y", dec!(25.00))],
        ])
        .append_query_results([vec![budget_model(1, 7, 1, dec!(15.00))]])
        .into_connection();
    let app = order_router(db);
    let token = token_for_user(7, "ada@example.com", false);

    let response = app
        .oneshot(post_orders(&place_order_body(), Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Insufficient budget");
    assert_eq!(decimal_field(&json, "required"), dec!(85.00));
    assert_eq!(decimal_field(&json, "available"), dec!(15.00));
    assert_eq!(decimal_field(&json, "shortfall"), dec!(70.00));
}

/// Read-back: GET /orders/{id} returns the same line items that were
/// submitted (product id, quantity, unit price, total price).
#[tokio::test]
async fn get_order_returns_line_items() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![order_model(50, 7, 1)]])
        .append_query_results([vec![
            line_item_model(500, 50, 10, 2, dec!(30.00)),
            line_item_model(501, 50, 11, 1, dec!(25.00)),
        ]])
        .append_query_results([vec![
            product_model(10, 1, "X", dec!(30.00)),
            product_model(11, 1, "Y", dec!(25.00)),
        ]])
        .into_connection();
    let app = order_router(db);
    let token = token_for_user(7, "ada@example.com", false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/50")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["id"], 50);
    assert_eq!(decimal_field(&json, "total"), dec!(85.00));

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product"]["id"], 10);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(decimal_field(&items[0], "unit_price"), dec!(30.00));
    assert_eq!(decimal_field(&items[0], "total_price"), dec!(60.00));
    assert_eq!(items[1]["product"]["id"], 11);
    assert_eq!(items[1]["quantity"], 1);
}

#[tokio::test]
async fn get_order_forbidden_for_other_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![order_model(50, 7, 1)]])
        .into_connection();
    let app = order_router(db);
    let token = token_for_user(8, "eve@example.com", false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/50")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn get_order_allowed_for_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![order_model(50, 7, 1)]])
        .append_query_results([vec![line_item_model(500, 50, 10, 2, dec!(30.00))]])
        .append_query_results([vec![product_model(10, 1, "X", dec!(30.00))]])
        .into_connection();
    let app = order_router(db);
    let token = token_for_user(8, "admin@example.com", true);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/50")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
