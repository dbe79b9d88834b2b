//! Budget request/response models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetResponse {
    pub user_id: i32,
    pub app_id: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditBudgetRequest {
    /// Target user; defaults to the acting user when omitted
    #[serde(default)]
    pub user_id: Option<i32>,
    pub amount: Decimal,
}
