//! Product endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Set};

use crate::auth::AuthUser;
use crate::entities::{categories, products, prelude::*};
use crate::models::error::ErrorResponse;
use crate::models::product::{CreateProductRequest, ProductResponse};
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

fn forbidden() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::new("You do not have access to this app")),
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
        return Err(forbidden());
    }

    Ok(())
}

/// POST /categories/{category_id}/products
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(category_id): Path<i32>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), (StatusCode, Json<ErrorResponse>)> {
    let category = Categories::find_by_id(category_id)
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!(
                    "Category {} not found",
                    category_id
                ))),
            )
        })?;

    check_app_access(&state, category.app_id, user.id).await?;

    if payload.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Bad request",
                "Missing required field: name",
            )),
        ));
    }
    if payload.price < Decimal::ZERO {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Bad request",
                "Price must not be negative",
            )),
        ));
    }
    if payload.stock < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Bad request",
                "Stock must not be negative",
            )),
        ));
    }

    let product = products::ActiveModel {
        category_id: Set(category.id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        image_path: Set(payload.image_path),
        price: Set(payload.price),
        stock: Set(payload.stock),
        sku: Set(payload.sku),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(&*state.db)
    .await
    .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, (StatusCode, Json<ErrorResponse>)> {
    let product = Products::find_by_id(id)
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("Product {} not found", id))),
            )
        })?;

    let category = Categories::find_by_id(product.category_id)
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Category not found")),
            )
        })?;

    check_app_access(&state, category.app_id, user.id).await?;

    Ok(Json(ProductResponse::from(product)))
}

/// GET /apps/{app_id}/products
pub async fn list_products_for_app(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
) -> Result<Json<Vec<ProductResponse>>, (StatusCode, Json<ErrorResponse>)> {
    check_app_access(&state, app_id, user.id).await?;

    let category_ids: Vec<i32> = Categories::find()
        .filter(categories::Column::AppId.eq(app_id))
        .all(&*state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|category| category.id)
        .collect();

    if category_ids.is_empty() {
        return Ok(Json(vec![]));
    }

    let rows = Products::find()
        .filter(products::Column::CategoryId.is_in(category_ids))
        .order_by(products::Column::Name, Order::Asc)
        .all(&*state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(rows.into_iter().map(ProductResponse::from).collect()))
}
