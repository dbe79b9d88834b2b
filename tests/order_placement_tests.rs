//! Service-level tests for the order placement flow, run against a mock
//! database so the exact query/write sequence is controlled per scenario.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use storefront_backend::auth::AuthUser;
use storefront_backend::models::order::{CartLine, PlaceOrderRequest};
use storefront_backend::services::order_placement::{self, OrderPlacementError};

use crate::common::{app_model, budget_model, line_item_model, order_model, product_model};

fn buyer() -> AuthUser {
    AuthUser {
        id: 7,
        email: "ada@example.com".to_string(),
        is_admin: false,
    }
}

fn request_for(cart_items: Vec<CartLine>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        delivery_type: "home".to_string(),
        shipping: None,
        app_id: Some(1),
        cart_items,
    }
}

/// Worked example: budget 100.00, cart = X@30.00 x2 + Y@25.00 x1 = 85.00.
#[tokio::test]
async fn order_succeeds_and_reports_cart_total() {
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

    let response = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![
            CartLine {
                product_id: 10,
                quantity: 2,
            },
            CartLine {
                product_id: 11,
                quantity: 1,
            },
        ]),
    )
    .await
    .unwrap();

    assert_eq!(response.total, dec!(85.00));
    assert_eq!(response.full_name, "Ada Lovelace");
    assert_eq!(response.delivery_location, "Home delivery");
    assert_eq!(response.items.len(), 2);
    assert_eq!(response.items[0].unit_price, dec!(30.00));
    assert_eq!(response.items[0].total_price, dec!(60.00));
    assert_eq!(response.items[1].total_price, dec!(25.00));
}

/// Pricing property: the total is independent of cart line ordering.
#[tokio::test]
async fn cart_total_is_order_independent() {
    async fn total_for(
        lines: Vec<CartLine>,
        product_batches: Vec<Vec<storefront_backend::entities::products::Model>>,
    ) -> Decimal {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![app_model(1, 7)]])
            .append_query_results(product_batches)
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

        order_placement::place_order(&db, &buyer(), request_for(lines))
            .await
            .unwrap()
            .total
    }

    let forward = total_for(
        vec![
            CartLine {
                product_id: 10,
                quantity: 2,
            },
            CartLine {
                product_id: 11,
                quantity: 1,
            },
        ],
        vec![
            vec![product_model(10, 1, "X", dec!(30.00))],
            vec![product_model(11, 1, "Y", dec!(25.00))],
        ],
    )
    .await;

    let reversed = total_for(
        vec![
            CartLine {
                product_id: 11,
                quantity: 1,
            },
            CartLine {
                product_id: 10,
                quantity: 2,
            },
        ],
        vec![
            vec![product_model(11, 1, "Y", dec!(25.00))],
            vec![product_model(10, 1, "X", dec!(30.00))],
        ],
    )
    .await;

    assert_eq!(forward, dec!(85.00));
    assert_eq!(forward, reversed);
}

/// Boundary: a budget exactly equal to the total is sufficient.
#[tokio::test]
async fn budget_equal_to_total_succeeds() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([vec![product_model(10, 1, "X", dec!(85.00))]])
        .append_query_results([vec![budget_model(1, 7, 1, dec!(85.00))]])
        .append_query_results([vec![order_model(50, 7, 1)]])
        .append_query_results([vec![line_item_model(500, 50, 10, 1, dec!(85.00))]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let response = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![CartLine {
            product_id: 10,
            quantity: 1,
        }]),
    )
    .await
    .unwrap();

    assert_eq!(response.total, dec!(85.00));
}

/// Worked example, second attempt: balance 15.00 against an 85.00 cart must
/// fail with the exact shortfall and write nothing.
#[tokio::test]
async fn insufficient_budget_creates_nothing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([
            vec![product_model(10, 1, "X", dec!(30.00))],
            vec![product_model(11, 1, "Y", dec!(25.00))],
        ])
        .append_query_results([vec![budget_model(1, 7, 1, dec!(15.00))]])
        .into_connection();

    let err = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![
            CartLine {
                product_id: 10,
                quantity: 2,
            },
            CartLine {
                product_id: 11,
                quantity: 1,
            },
        ]),
    )
    .await
    .unwrap_err();

    match err {
        OrderPlacementError::InsufficientBudget {
            required,
            available,
            shortfall,
        } => {
            assert_eq!(required, dec!(85.00));
            assert_eq!(available, dec!(15.00));
            assert_eq!(shortfall, dec!(70.00));
        }
        other => panic!("expected InsufficientBudget, got {:?}", other),
    }

    let log = format!("{:?}", db.into_transaction_log());
    assert!(!log.contains("INSERT"), "no order may be written: {}", log);
    assert!(!log.contains("UPDATE"), "no budget may be debited: {}", log);
}

/// A missing budget row reads as zero funds, not an error.
#[tokio::test]
async fn missing_budget_row_counts_as_zero() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([vec![product_model(10, 1, "X", dec!(30.00))]])
        .append_query_results([Vec::<storefront_backend::entities::budgets::Model>::new()])
        .into_connection();

    let err = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![CartLine {
            product_id: 10,
            quantity: 1,
        }]),
    )
    .await
    .unwrap_err();

    match err {
        OrderPlacementError::InsufficientBudget {
            required,
            available,
            shortfall,
        } => {
            assert_eq!(required, dec!(30.00));
            assert_eq!(available, Decimal::ZERO);
            assert_eq!(shortfall, dec!(30.00));
        }
        other => panic!("expected InsufficientBudget, got {:?}", other),
    }
}

/// Compensation: when the conditional debit affects zero rows after the
/// order was persisted, the order is deleted again and the call fails.
#[tokio::test]
async fn failed_debit_deletes_the_persisted_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([vec![product_model(10, 1, "X", dec!(30.00))]])
        // Advisory read says the funds are there...
        .append_query_results([vec![budget_model(1, 7, 1, dec!(100.00))]])
        .append_query_results([vec![order_model(50, 7, 1)]])
        .append_query_results([vec![line_item_model(500, 50, 10, 1, dec!(30.00))]])
        // ...but a concurrent order drained it before the debit ran
        .append_query_results([vec![budget_model(1, 7, 1, dec!(10.00))]])
        .append_exec_results([
            // debit: zero rows matched the amount >= total condition
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            // compensating delete
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();

    let err = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![CartLine {
            product_id: 10,
            quantity: 1,
        }]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, OrderPlacementError::BudgetDebitFailed));

    let log = format!("{:?}", db.into_transaction_log());
    assert!(
        log.contains("DELETE"),
        "compensating delete must run: {}",
        log
    );
}

/// A user who is neither owner nor assigned gets Forbidden before any
/// pricing or persistence happens, regardless of budget.
#[tokio::test]
async fn non_member_is_denied_and_nothing_is_written() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 999)]])
        .append_query_results([Vec::<storefront_backend::entities::app_users::Model>::new()])
        .into_connection();

    let err = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![CartLine {
            product_id: 10,
            quantity: 1,
        }]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, OrderPlacementError::AccessDenied));

    let log = format!("{:?}", db.into_transaction_log());
    assert!(!log.contains("INSERT"), "no order may be written: {}", log);
}

/// An assigned (non-owner) user may place orders.
#[tokio::test]
async fn assigned_user_may_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 999)]])
        .append_query_results([vec![common::app_user_model(1, 1, 7)]])
        .append_query_results([vec![product_model(10, 1, "X", dec!(30.00))]])
        .append_query_results([vec![budget_model(1, 7, 1, dec!(100.00))]])
        .append_query_results([vec![order_model(50, 7, 1)]])
        .append_query_results([vec![line_item_model(500, 50, 10, 1, dec!(30.00))]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let response = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![CartLine {
            product_id: 10,
            quantity: 1,
        }]),
    )
    .await
    .unwrap();

    assert_eq!(response.total, dec!(30.00));
}

/// Every cart line must reference an existing product; the failure names it.
#[tokio::test]
async fn unknown_product_fails_with_its_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![app_model(1, 7)]])
        .append_query_results([Vec::<storefront_backend::entities::products::Model>::new()])
        .into_connection();

    let err = order_placement::place_order(
        &db,
        &buyer(),
        request_for(vec![CartLine {
            product_id: 42,
            quantity: 1,
        }]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, OrderPlacementError::ProductNotFound(42)));
}
