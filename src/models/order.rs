//! Order placement request/response models.
//!
//! Responses are hand-written DTOs; entities are never serialized directly.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{order_line_items, orders, products};

/// A (product, quantity) pair submitted at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// Request body for POST /orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub delivery_type: String,
    /// Optional free-text shipping address
    #[serde(default)]
    pub shipping: Option<String>,
    #[serde(default)]
    pub app_id: Option<i32>,
    #[serde(default)]
    pub cart_items: Vec<CartLine>,
}

/// Delivery destination for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Home,
    Office,
}

impl DeliveryType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "home" => Some(Self::Home),
            "office" => Some(Self::Office),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Office => "office",
        }
    }

    /// User-facing label used in responses
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Home => "Home delivery",
            Self::Office => "Office delivery",
        }
    }
}

/// Product summary nested in a line item response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItemResponse {
    pub id: i32,
    pub product: ProductSummary,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub full_name: String,
    pub email: String,
    pub delivery_type: String,
    pub delivery_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub user_id: i32,
    pub app_id: i32,
    pub total: Decimal,
    pub created_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub items: Vec<OrderLineItemResponse>,
}

impl OrderResponse {
    /// Assemble the response DTO from the order row, its line items, and the
    /// product rows the items reference.
    pub fn from_parts(
        order: orders::Model,
        items: Vec<(order_line_items::Model, ProductSummary)>,
    ) -> Self {
        let total = items.iter().map(|(item, _)| item.total_price).sum();
        let delivery_location = DeliveryType::parse(&order.delivery_type)
            .map(|d| d.display_label().to_string())
            .unwrap_or_else(|| order.delivery_type.clone());

        Self {
            id: order.id,
            full_name: format!("{} {}", order.firstname, order.lastname),
            firstname: order.firstname,
            lastname: order.lastname,
            email: order.email,
            delivery_type: order.delivery_type,
            delivery_location,
            shipping_address: order.shipping_address,
            user_id: order.user_id,
            app_id: order.app_id,
            total,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items
                .into_iter()
                .map(|(item, product)| OrderLineItemResponse {
                    id: item.id,
                    product,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                })
                .collect(),
        }
    }
}

impl From<&products::Model> for ProductSummary {
    fn from(product: &products::Model) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
        }
    }
}
