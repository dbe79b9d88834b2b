//! Cart endpoints — a pre-checkout staging area per (user, app).
//!
//! Cart lines are priced with current product prices for display; order
//! placement re-prices from its own request body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::auth::AuthUser;
use crate::entities::{cart_items, prelude::*, products};
use crate::models::cart::{AddCartItemRequest, CartItemResponse, CartResponse};
use crate::models::error::ErrorResponse;
use crate::models::order::ProductSummary;
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

async fn check_app_access(
    state: &AppState,
    app_id: i32,
    user_id: i32,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
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

    if !app_access::can_access_app(&*state.db, &app, user_id)
        .await
        .map_err(db_error)?
    {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("You do not have access to this app")),
        ));
    }

    Ok(())
}

/// GET /cart/{app_id}
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_app_access(&state, app_id, user.id).await?;

    let lines = CartItems::find()
        .filter(cart_items::Column::UserId.eq(user.id))
        .filter(cart_items::Column::AppId.eq(app_id))
        .all(&*state.db)
        .await
        .map_err(db_error)?;

    let product_ids: Vec<i32> = lines.iter().map(|line| line.product_id).collect();
    let product_rows = if product_ids.is_empty() {
        vec![]
    } else {
        Products::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(&*state.db)
            .await
            .map_err(db_error)?
    };

    let mut items = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;
    for line in lines {
        let Some(product) = product_rows.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        let line_total = product.price * Decimal::from(line.quantity);
        total += line_total;
        items.push(CartItemResponse {
            id: line.id,
            product: ProductSummary::from(product),
            quantity: line.quantity,
            unit_price: product.price,
            line_total,
        });
    }

    Ok(Json(CartResponse {
        app_id,
        items,
        total,
    }))
}

/// POST /cart/{app_id}/items — sets the quantity for the product line
pub async fn add_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>), (StatusCode, Json<ErrorResponse>)> {
    check_app_access(&state, app_id, user.id).await?;

    if payload.quantity < 1 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Bad request",
                "Quantity must be at least 1",
            )),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!(
                    "Product {} not found",
                    payload.product_id
                ))),
            )
        })?;

    // The product must belong to the app the cart is scoped to
    let category = Categories::find_by_id(product.category_id)
        .one(&*state.db)
        .await
        .map_err(db_error)?;
    if category.map(|c| c.app_id) != Some(app_id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "Product {} not found in app {}",
                payload.product_id, app_id
            ))),
        ));
    }

    let existing = CartItems::find()
        .filter(cart_items::Column::UserId.eq(user.id))
        .filter(cart_items::Column::AppId.eq(app_id))
        .filter(cart_items::Column::ProductId.eq(payload.product_id))
        .one(&*state.db)
        .await
        .map_err(db_error)?;

    let line = match existing {
        Some(line) => {
            let mut active: cart_items::ActiveModel = line.into();
            active.quantity = Set(payload.quantity);
            active.updated_at = Set(Some(Utc::now().fixed_offset()));
            active.update(&*state.db).await.map_err(db_error)?
        }
        None => cart_items::ActiveModel {
            user_id: Set(user.id),
            app_id: Set(app_id),
            product_id: Set(payload.product_id),
            quantity: Set(payload.quantity),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&*state.db)
        .await
        .map_err(db_error)?,
    };

    let line_total = product.price * Decimal::from(line.quantity);

    Ok((
        StatusCode::CREATED,
        Json(CartItemResponse {
            id: line.id,
            product: ProductSummary::from(&product),
            quantity: line.quantity,
            unit_price: product.price,
            line_total,
        }),
    ))
}

/// DELETE /cart/{app_id}/items/{product_id}
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((app_id, product_id)): Path<(i32, i32)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    check_app_access(&state, app_id, user.id).await?;

    CartItems::delete_many()
        .filter(cart_items::Column::UserId.eq(user.id))
        .filter(cart_items::Column::AppId.eq(app_id))
        .filter(cart_items::Column::ProductId.eq(product_id))
        .exec(&*state.db)
        .await
        .map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart/{app_id}
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    check_app_access(&state, app_id, user.id).await?;

    CartItems::delete_many()
        .filter(cart_items::Column::UserId.eq(user.id))
        .filter(cart_items::Column::AppId.eq(app_id))
        .exec(&*state.db)
        .await
        .map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}
