//! Budget endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;

use crate::auth::AuthUser;
use crate::entities::prelude::*;
use crate::models::budget::{BudgetResponse, CreditBudgetRequest};
use crate::models::error::ErrorResponse;
use crate::services::{app_access, budget_ledger};
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

/// GET /budgets/{app_id} — the caller's own budget for the app
pub async fn get_budget(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
) -> Result<Json<BudgetResponse>, (StatusCode, Json<ErrorResponse>)> {
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

    // Missing budget row reads as zero
    let amount = budget_ledger::get_amount(&*state.db, user.id, app_id)
        .await
        .map_err(db_error)?;

    Ok(Json(BudgetResponse {
        user_id: user.id,
        app_id,
        amount,
    }))
}

/// POST /budgets/{app_id}/credit — app owner tops up a user's budget
pub async fn credit_budget(
    State(state): State<AppState>,
    user: AuthUser,
    Path(app_id): Path<i32>,
    Json(payload): Json<CreditBudgetRequest>,
) -> Result<Json<BudgetResponse>, (StatusCode, Json<ErrorResponse>)> {
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

    if app.owner_id != user.id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Only the app owner can credit budgets")),
        ));
    }

    if payload.amount <= Decimal::ZERO {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Bad request",
                "Credit amount must be positive",
            )),
        ));
    }

    let target_user = payload.user_id.unwrap_or(user.id);

    budget_ledger::credit(&*state.db, target_user, app_id, payload.amount)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_message("Credit failed", e.to_string())),
            )
        })?;

    let amount = budget_ledger::get_amount(&*state.db, target_user, app_id)
        .await
        .map_err(db_error)?;

    tracing::info!(app_id, target_user, amount = %payload.amount, "Budget credited");

    Ok(Json(BudgetResponse {
        user_id: target_user,
        app_id,
        amount,
    }))
}
