//! App (storefront) endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::auth::AuthUser;
use crate::entities::{app_users, apps, prelude::*};
use crate::models::app::{AppResponse, CreateAppRequest};
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

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_message("Bad request", message)),
    )
}

/// Lowercase-alphanumeric-hyphen, non-empty
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// POST /apps
pub async fn create_app(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAppRequest>,
) -> Result<(StatusCode, Json<AppResponse>), (StatusCode, Json<ErrorResponse>)> {
    if payload.title.trim().is_empty() {
        return Err(bad_request("Missing required field: title"));
    }
    if payload.company_name.trim().is_empty() {
        return Err(bad_request("Missing required field: company_name"));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(bad_request("A valid email is required"));
    }
    if !is_valid_slug(&payload.slug) {
        return Err(bad_request(
            "Slug must be lowercase alphanumeric with hyphens",
        ));
    }

    let existing = Apps::find()
        .filter(apps::Column::Slug.eq(payload.slug.clone()))
        .one(&*state.db)
        .await
        .map_err(db_error)?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("Slug already in use")),
        ));
    }

    let app = apps::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        slug: Set(payload.slug),
        company_name: Set(payload.company_name.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        description: Set(payload.description),
        logo_path: Set(payload.logo_path),
        owner_id: Set(user.id),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(&*state.db)
    .await
    .map_err(db_error)?;

    tracing::info!(app_id = app.id, owner_id = user.id, slug = %app.slug, "App created");

    Ok((StatusCode::CREATED, Json(AppResponse::from(app))))
}

/// GET /apps — apps the caller owns or is assigned to
pub async fn list_my_apps(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<AppResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let mut owned = Apps::find()
        .filter(apps::Column::OwnerId.eq(user.id))
        .all(&*state.db)
        .await
        .map_err(db_error)?;

    let assigned_ids: Vec<i32> = AppUsers::find()
        .filter(app_users::Column::UserId.eq(user.id))
        .all(&*state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|row| row.app_id)
        .collect();

    if !assigned_ids.is_empty() {
        let assigned = Apps::find()
            .filter(apps::Column::Id.is_in(assigned_ids))
            .all(&*state.db)
            .await
            .map_err(db_error)?;
        owned.extend(assigned);
    }

    owned.sort_by_key(|app| app.id);
    owned.dedup_by_key(|app| app.id);

    Ok(Json(owned.into_iter().map(AppResponse::from).collect()))
}

/// GET /apps/slug/{slug} — owner or assigned user only
pub async fn get_app_by_slug(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<AppResponse>, (StatusCode, Json<ErrorResponse>)> {
    let app = Apps::find()
        .filter(apps::Column::Slug.eq(slug.clone()))
        .one(&*state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("App '{}' not found", slug))),
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

    Ok(Json(AppResponse::from(app)))
}

#[cfg(test)]
mod tests {
    use super::is_valid_slug;

    #[test]
    fn slug_validation() {
        assert!(is_valid_slug("my-shop-42"));
        assert!(is_valid_slug("shop"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("My-Shop"));
        assert!(!is_valid_slug("shop_42"));
        assert!(!is_valid_slug("shop 42"));
    }
}
