//! Order endpoints.
//!
//! POST /orders delegates to the order placement service and maps its error
//! taxonomy onto HTTP statuses; the GET endpoints enforce owner/admin and
//! app-membership access rules.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder};

use crate::auth::AuthUser;
use crate::entities::{orders, prelude::*};
use crate::models::error::{ErrorResponse, InsufficientBudgetResponse};
use crate::models::order::{OrderResponse, PlaceOrderRequest};
use crate::services::order_placement::{self, OrderPlacementError};
use crate::services::app_access;
use crate::AppState;

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::with_message(
            "Database error",
            e.to_string(),
        )),
    )
}

fn map_placement_error(e: OrderPlacementError) -> (StatusCode, Json<serde_json::Value>) {
    use OrderPlacementError::*;

    let (status, body) = match e {
        InsufficientBudget {
            required,
            available,
            shortfall,
        } => (
            StatusCode::BAD_REQUEST,
            serde_json::to_value(InsufficientBudgetResponse {
                error: "Insufficient budget".to_string(),
                required,
                available,
                shortfall,
            })
            .unwrap_or_default(),
        ),
        MissingField(_) | InvalidEmail | InvalidDeliveryType(_) | InvalidQuantity { .. }
        | EmptyCart => (
            StatusCode::BAD_REQUEST,
            serde_json::to_value(ErrorResponse::with_message("Bad request", e.to_string()))
                .unwrap_or_default(),
        ),
        AppNotFound(_) | ProductNotFound(_) => (
            StatusCode::NOT_FOUND,
            serde_json::to_value(ErrorResponse::with_message("Not found", e.to_string()))
                .unwrap_or_default(),
        ),
        AccessDenied => (
            StatusCode::FORBIDDEN,
            serde_json::to_value(ErrorResponse::with_message("Forbidden", e.to_string()))
                .unwrap_or_default(),
        ),
        BudgetDebitFailed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::to_value(ErrorResponse::with_message(
                "Budget reduction failed",
                e.to_string(),
            ))
            .unwrap_or_default(),
        ),
        Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::to_value(ErrorResponse::with_message(
                "Database error",
                e.to_string(),
            ))
            .unwrap_or_default(),
        ),
    };

    (status, Json(body))
}

/// POST /orders
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), (StatusCode, Json<serde_json::Value>)> {
    let correlation_id = uuid::Uuid::new_v4();
    tracing::info!(
        %correlation_id,
        user_id = user.id,
        app_id = ?payload.app_id,
        lines = payload.cart_items.len(),
        "Order placement request received"
    );

    match order_placement::place_order(&*state.db, &user, payload).await {
        Ok(order) => Ok((StatusCode::CREATED, Json(order))),
        Err(e) => {
            tracing::warn!(%correlation_id, "Order placement failed: {}", e);
            Err(map_placement_error(e))
        }
    }
}

/// GET /orders/{id} — order owner or admin only
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, (StatusCode, Json<ErrorResponse>)> {
    let order = Orders::find_by_id(id)
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("Order {} not found", id))),
            )
        })?;

    if order.user_id != user.id && !user.is_admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("You do not have access to this order")),
        ));
    }

    let response = order_placement::load_order(&*state.db, order)
        .await
        .map_err(db_error)?;

    Ok(Json(response))
}

/// GET /orders/user/{user_id} — self or admin only
pub async fn get_orders_for_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<OrderResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if user_id != user.id && !user.is_admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("You can only list your own orders")),
        ));
    }

    let order_rows = Orders::find()
        .filter(orders::Column::UserId.eq(user_id))
        .order_by(orders::Column::CreatedAt, Order::Desc)
        .all(&*state.db)
        .await
        .map_err(db_error)?;

    let mut responses = Vec::with_capacity(order_rows.len());
    for order in order_rows {
        responses.push(
            order_placement::load_order(&*state.db, order)
                .await
                .map_err(db_error)?,
        );
    }

    Ok(Json(responses))
}

/// GET /orders/app/{app_id} — app owner or assigned user only
pub async fn get_orders_for_app(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
) -> Result<Json<Vec<OrderResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let app = Apps::find_by_id(app_id)
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("App {} not found", app_id))),
            )
        })?;

    if !app_access::can_access_app(&*state.db, &app, user.id)
        .await
        .map_err(db_error)?
    {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("You do not have access to this app")),
        ));
    }

    let order_rows = Orders::find()
        .filter(orders::Column::AppId.eq(app_id))
        .order_by(orders::Column::CreatedAt, Order::Desc)
        .all(&*state.db)
        .await
        .map_err(db_error)?;

    let mut responses = Vec::with_capacity(order_rows.len());
    for order in order_rows {
        responses.push(
            order_placement::load_order(&*state.db, order)
                .await
                .map_err(db_error)?,
        );
    }

    Ok(Json(responses))
}
