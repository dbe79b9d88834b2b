//! Budget ledger for per-(user, app) spending allowances.
//!
//! The debit is a single conditional decrement executed in one statement
//! (`UPDATE ... SET amount = amount - :x WHERE ... AND amount >= :x`), so
//! two concurrent orders can never both pass a stale sufficiency check and
//! overdraw the same budget.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::entities::budgets::{self, Entity as Budgets};

/// Error types for budget mutations
#[derive(Debug)]
pub enum BudgetError {
    /// No budget row exists for the (user, app) pair
    NotFound,
    /// A row exists but cannot cover the requested amount
    Insufficient { available: Decimal },
    Database(DbErr),
}

impl std::fmt::Display for BudgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetError::NotFound => write!(f, "No budget exists for this user and app"),
            BudgetError::Insufficient { available } => {
                write!(f, "Budget has only {} available", available)
            }
            BudgetError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for BudgetError {}

impl From<DbErr> for BudgetError {
    fn from(e: DbErr) -> Self {
        BudgetError::Database(e)
    }
}

async fn find_row(
    db: &DatabaseConnection,
    user_id: i32,
    app_id: i32,
) -> Result<Option<budgets::Model>, DbErr> {
    Budgets::find()
        .filter(budgets::Column::UserId.eq(user_id))
        .filter(budgets::Column::AppId.eq(app_id))
        .one(db)
        .await
}

/// Current budget amount; a missing row reads as zero, not an error.
pub async fn get_amount(
    db: &DatabaseConnection,
    user_id: i32,
    app_id: i32,
) -> Result<Decimal, DbErr> {
    Ok(find_row(db, user_id, app_id)
        .await?
        .map(|budget| budget.amount)
        .unwrap_or(Decimal::ZERO))
}

/// Whether the budget covers `amount`. Equality is sufficient.
pub async fn has_sufficient(
    db: &DatabaseConnection,
    user_id: i32,
    app_id: i32,
    amount: Decimal,
) -> Result<bool, DbErr> {
    Ok(get_amount(db, user_id, app_id).await? >= amount)
}

/// Atomically decrement the budget by `amount`.
///
/// The WHERE clause carries the sufficiency condition, so the statement
/// affects zero rows when the balance is too low (or the row is missing);
/// the follow-up read only distinguishes the two failure cases.
pub async fn debit(
    db: &DatabaseConnection,
    user_id: i32,
    app_id: i32,
    amount: Decimal,
) -> Result<(), BudgetError> {
    let result = Budgets::update_many()
        .col_expr(
            budgets::Column::Amount,
            Expr::col(budgets::Column::Amount).sub(amount),
        )
        .col_expr(
            budgets::Column::UpdatedAt,
            Expr::value(Some(Utc::now().fixed_offset())),
        )
        .filter(budgets::Column::UserId.eq(user_id))
        .filter(budgets::Column::AppId.eq(app_id))
        .filter(budgets::Column::Amount.gte(amount))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::debug!(user_id, app_id, %amount, "Debited budget");
        return Ok(());
    }

    match find_row(db, user_id, app_id).await? {
        None => Err(BudgetError::NotFound),
        Some(budget) => Err(BudgetError::Insufficient {
            available: budget.amount,
        }),
    }
}

/// Increment the budget by `amount`, creating the row when absent.
pub async fn credit(
    db: &DatabaseConnection,
    user_id: i32,
    app_id: i32,
    amount: Decimal,
) -> Result<(), BudgetError> {
    let result = Budgets::update_many()
        .col_expr(
            budgets::Column::Amount,
            Expr::col(budgets::Column::Amount).add(amount),
        )
        .col_expr(
            budgets::Column::UpdatedAt,
            Expr::value(Some(Utc::now().fixed_offset())),
        )
        .filter(budgets::Column::UserId.eq(user_id))
        .filter(budgets::Column::AppId.eq(app_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        budgets::ActiveModel {
            user_id: Set(user_id),
            app_id: Set(app_id),
            amount: Set(amount),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    tracing::debug!(user_id, app_id, %amount, "Credited budget");
    Ok(())
}
