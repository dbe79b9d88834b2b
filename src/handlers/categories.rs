//! Category endpoints, scoped under an app.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Set};

use crate::auth::AuthUser;
use crate::entities::{apps, categories, prelude::*};
use crate::models::category::{CategoryResponse, CreateCategoryRequest};
use crate::models::error::ErrorResponse;
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

async fn resolve_accessible_app(
    state: &AppState,
    app_id: i32,
    user_id: i32,
) -> Result<apps::Model, (StatusCode, Json<ErrorResponse>)> {
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

    Ok(app)
}

/// POST /apps/{app_id}/categories
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), (StatusCode, Json<ErrorResponse>)> {
    let app = resolve_accessible_app(&state, app_id, user.id).await?;

    if payload.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Bad request",
                "Missing required field: name",
            )),
        ));
    }

    let duplicate = Categories::find()
        .filter(categories::Column::AppId.eq(app.id))
        .filter(categories::Column::Slug.eq(payload.slug.clone()))
        .one(&*state.db)
        .await
        .map_err(db_error)?;
    if duplicate.is_some() {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("Category slug already in use")),
        ));
    }

    let category = categories::ActiveModel {
        app_id: Set(app.id),
        name: Set(payload.name.trim().to_string()),
        slug: Set(payload.slug),
        description: Set(payload.description),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(&*state.db)
    .await
    .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// GET /apps/{app_id}/categories
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
) -> Result<Json<Vec<CategoryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let app = resolve_accessible_app(&state, app_id, user.id).await?;

    let rows = Categories::find()
        .filter(categories::Column::AppId.eq(app.id))
        .order_by(categories::Column::Name, Order::Asc)
        .all(&*state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(rows.into_iter().map(CategoryResponse::from).collect()))
}
