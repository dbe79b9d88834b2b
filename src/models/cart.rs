//! Cart request/response models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::order::ProductSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub id: i32,
    pub product: ProductSummary,
    pub quantity: i32,
    /// Current product price; not a snapshot
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub app_id: i32,
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
}
