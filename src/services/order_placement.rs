//! Order placement.
//!
//! The flow is a linear transaction script: validate the request, check the
//! caller may act on the app, price every cart line against current product
//! prices in one complete pass, gate on the budget, persist the order with
//! its line items, then debit the budget. The debit is atomic (see
//! `budget_ledger`); when it still fails under concurrent exhaustion, the
//! just-persisted order is deleted as a compensating action and the call
//! fails. Product stock is intentionally not decremented here.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::auth::AuthUser;
use crate::entities::order_line_items::{self, Entity as OrderLineItems};
use crate::entities::orders::{self, Entity as Orders};
use crate::entities::products::{self, Entity as Products};
use crate::entities::apps::Entity as Apps;
use crate::models::order::{
    DeliveryType, OrderResponse, PlaceOrderRequest, ProductSummary,
};
use crate::services::{app_access, budget_ledger};

/// Error types for order placement. All are terminal for the request.
#[derive(Debug)]
pub enum OrderPlacementError {
    MissingField(&'static str),
    InvalidEmail,
    InvalidDeliveryType(String),
    InvalidQuantity { product_id: i32, quantity: i32 },
    EmptyCart,
    AppNotFound(i32),
    AccessDenied,
    ProductNotFound(i32),
    InsufficientBudget {
        required: Decimal,
        available: Decimal,
        shortfall: Decimal,
    },
    /// The budget debit failed after the order was persisted; the order has
    /// been deleted again (compensation).
    BudgetDebitFailed,
    Database(DbErr),
}

impl std::fmt::Display for OrderPlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPlacementError::MissingField(field) => {
                write!(f, "Missing required field: {}", field)
            }
            OrderPlacementError::InvalidEmail => write!(f, "Invalid email address"),
            OrderPlacementError::InvalidDeliveryType(value) => {
                write!(f, "Invalid delivery type '{}', expected home or office", value)
            }
            OrderPlacementError::InvalidQuantity {
                product_id,
                quantity,
            } => write!(
                f,
                "Invalid quantity {} for product {}",
                quantity, product_id
            ),
            OrderPlacementError::EmptyCart => write!(f, "Cart must contain at least one item"),
            OrderPlacementError::AppNotFound(id) => write!(f, "App {} not found", id),
            OrderPlacementError::AccessDenied => {
                write!(f, "You do not have access to this app")
            }
            OrderPlacementError::ProductNotFound(id) => write!(f, "Product {} not found", id),
            OrderPlacementError::InsufficientBudget {
                required,
                available,
                shortfall,
            } => write!(
                f,
                "Insufficient budget: required {}, available {}, shortfall {}",
                required, available, shortfall
            ),
            OrderPlacementError::BudgetDebitFailed => {
                write!(f, "Budget reduction failed; the order was rolled back")
            }
            OrderPlacementError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for OrderPlacementError {}

impl From<DbErr> for OrderPlacementError {
    fn from(e: DbErr) -> Self {
        OrderPlacementError::Database(e)
    }
}

fn validate_request(req: &PlaceOrderRequest) -> Result<(DeliveryType, i32), OrderPlacementError> {
    if req.firstname.trim().is_empty() {
        return Err(OrderPlacementError::MissingField("firstname"));
    }
    if req.lastname.trim().is_empty() {
        return Err(OrderPlacementError::MissingField("lastname"));
    }
    if req.email.trim().is_empty() {
        return Err(OrderPlacementError::MissingField("email"));
    }
    if !req.email.contains('@') {
        return Err(OrderPlacementError::InvalidEmail);
    }
    if req.delivery_type.trim().is_empty() {
        return Err(OrderPlacementError::MissingField("delivery_type"));
    }
    let delivery_type = DeliveryType::parse(&req.delivery_type)
        .ok_or_else(|| OrderPlacementError::InvalidDeliveryType(req.delivery_type.clone()))?;
    let app_id = req
        .app_id
        .ok_or(OrderPlacementError::MissingField("app_id"))?;
    if req.cart_items.is_empty() {
        return Err(OrderPlacementError::EmptyCart);
    }
    for line in &req.cart_items {
        if line.quantity < 1 {
            return Err(OrderPlacementError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
    }
    Ok((delivery_type, app_id))
}

/// Place an order for the authenticated user.
///
/// Side effects on success: one order row + N line items inserted, the
/// (user, app) budget decremented by the cart total. On the compensated
/// failure path the order is inserted and deleted again.
pub async fn place_order(
    db: &DatabaseConnection,
    user: &AuthUser,
    req: PlaceOrderRequest,
) -> Result<OrderResponse, OrderPlacementError> {
    let (delivery_type, app_id) = validate_request(&req)?;

    let app = Apps::find_by_id(app_id)
        .one(db)
        .await?
        .ok_or(OrderPlacementError::AppNotFound(app_id))?;

    if !app_access::can_access_app(db, &app, user.id).await? {
        return Err(OrderPlacementError::AccessDenied);
    }

    // Pricing pass: resolve every product and accumulate the total before
    // any mutation, so a missing product on line N cannot leave a
    // partially-priced order behind.
    let mut priced_lines: Vec<(products::Model, i32)> = Vec::with_capacity(req.cart_items.len());
    let mut cart_total = Decimal::ZERO;
    for line in &req.cart_items {
        let product = Products::find_by_id(line.product_id)
            .one(db)
            .await?
            .ok_or(OrderPlacementError::ProductNotFound(line.product_id))?;
        cart_total += product.price * Decimal::from(line.quantity);
        priced_lines.push((product, line.quantity));
    }

    // Budget gate: reject before any write. Equality is sufficient. The
    // read is advisory (it produces the shortfall message); correctness
    // against concurrent orders rests on the atomic debit below.
    let available = budget_ledger::get_amount(db, user.id, app_id).await?;
    if available < cart_total {
        return Err(OrderPlacementError::InsufficientBudget {
            required: cart_total,
            available,
            shortfall: cart_total - available,
        });
    }

    let now = Utc::now().fixed_offset();
    let order = orders::ActiveModel {
        firstname: Set(req.firstname.trim().to_string()),
        lastname: Set(req.lastname.trim().to_string()),
        email: Set(req.email.trim().to_string()),
        delivery_type: Set(delivery_type.as_str().to_string()),
        shipping_address: Set(req.shipping.clone()),
        user_id: Set(user.id),
        app_id: Set(app_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut items: Vec<(order_line_items::Model, ProductSummary)> =
        Vec::with_capacity(priced_lines.len());
    for (product, quantity) in &priced_lines {
        let inserted = order_line_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(*quantity),
            unit_price: Set(product.price),
            total_price: Set(product.price * Decimal::from(*quantity)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await;

        match inserted {
            Ok(item) => items.push((item, ProductSummary::from(product))),
            Err(e) => {
                // Line items cascade with the order
                delete_order_best_effort(db, order.id).await;
                return Err(OrderPlacementError::Database(e));
            }
        }
    }

    if let Err(e) = budget_ledger::debit(db, user.id, app_id, cart_total).await {
        tracing::error!(
            order_id = order.id,
            user_id = user.id,
            app_id,
            total = %cart_total,
            "Budget debit failed after order persistence, compensating: {}",
            e
        );
        delete_order_best_effort(db, order.id).await;
        return Err(OrderPlacementError::BudgetDebitFailed);
    }

    tracing::info!(
        order_id = order.id,
        user_id = user.id,
        app_id,
        total = %cart_total,
        items = items.len(),
        "Order placed"
    );

    Ok(OrderResponse::from_parts(order, items))
}

/// Compensating delete. A failure here leaves an orphan order with no
/// matching debit; that is an operator-visible inconsistency, so it is
/// logged at error level rather than silently dropped.
async fn delete_order_best_effort(db: &DatabaseConnection, order_id: i32) {
    if let Err(e) = Orders::delete_by_id(order_id).exec(db).await {
        tracing::error!(order_id, "Compensating order delete failed: {}", e);
    }
}

/// Load the response DTO for an already-persisted order.
pub async fn load_order(
    db: &DatabaseConnection,
    order: orders::Model,
) -> Result<OrderResponse, DbErr> {
    use sea_orm::{ColumnTrait, QueryFilter};

    let line_items = OrderLineItems::find()
        .filter(order_line_items::Column::OrderId.eq(order.id))
        .all(db)
        .await?;

    let product_ids: Vec<i32> = line_items.iter().map(|item| item.product_id).collect();
    let product_rows = Products::find()
        .filter(products::Column::Id.is_in(product_ids))
        .all(db)
        .await?;

    let items = line_items
        .into_iter()
        .map(|item| {
            let summary = product_rows
                .iter()
                .find(|p| p.id == item.product_id)
                .map(ProductSummary::from)
                .unwrap_or(ProductSummary {
                    id: item.product_id,
                    name: String::new(),
                    sku: None,
                });
            (item, summary)
        })
        .collect();

    Ok(OrderResponse::from_parts(order, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::CartLine;

    fn valid_request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            delivery_type: "home".to_string(),
            shipping: None,
            app_id: Some(1),
            cart_items: vec![CartLine {
                product_id: 10,
                quantity: 2,
            }],
        }
    }

    #[test]
    fn validate_accepts_complete_request() {
        let (delivery, app_id) = validate_request(&valid_request()).unwrap();
        assert_eq!(delivery, DeliveryType::Home);
        assert_eq!(app_id, 1);
    }

    #[test]
    fn validate_names_each_missing_field() {
        let mut req = valid_request();
        req.firstname = "  ".to_string();
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::MissingField("firstname"))
        ));

        let mut req = valid_request();
        req.lastname = String::new();
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::MissingField("lastname"))
        ));

        let mut req = valid_request();
        req.app_id = None;
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::MissingField("app_id"))
        ));
    }

    #[test]
    fn validate_rejects_bad_delivery_type() {
        let mut req = valid_request();
        req.delivery_type = "drone".to_string();
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::InvalidDeliveryType(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_cart() {
        let mut req = valid_request();
        req.cart_items.clear();
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::EmptyCart)
        ));
    }

    #[test]
    fn validate_rejects_non_positive_quantity() {
        let mut req = valid_request();
        req.cart_items[0].quantity = 0;
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::InvalidQuantity {
                product_id: 10,
                quantity: 0
            })
        ));
    }

    #[test]
    fn validate_rejects_email_without_at() {
        let mut req = valid_request();
        req.email = "not-an-email".to_string();
        assert!(matches!(
            validate_request(&req),
            Err(OrderPlacementError::InvalidEmail)
        ));
    }
}
