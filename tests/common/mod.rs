#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use storefront_backend::auth::{Claims, JwtContext};
use storefront_backend::entities::{app_users, apps, budgets, order_line_items, orders, products};
use storefront_backend::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState {
        db: std::sync::Arc::new(db),
        jwt: JwtContext::new(TEST_JWT_SECRET),
    }
}

pub fn token_for_user(user_id: i32, email: &str, admin: bool) -> String {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        admin,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn fixed_timestamp() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-08-01T12:00:00+00:00").unwrap()
}

pub fn app_model(id: i32, owner_id: i32) -> apps::Model {
    apps::Model {
        id,
        title: "Test Shop".to_string(),
        slug: format!("test-shop-{}", id),
        company_name: "Test Co".to_string(),
        email: "shop@example.com".to_string(),
        description: None,
        logo_path: None,
        owner_id,
        created_at: fixed_timestamp(),
        updated_at: None,
    }
}

pub fn app_user_model(id: i32, app_id: i32, user_id: i32) -> app_users::Model {
    app_users::Model {
        id,
        app_id,
        user_id,
    }
}

pub fn product_model(id: i32, category_id: i32, name: &str, price: Decimal) -> products::Model {
    products::Model {
        id,
        category_id,
        name: name.to_string(),
        description: None,
        image_path: None,
        price,
        stock: 10,
        sku: None,
        created_at: fixed_timestamp(),
        updated_at: None,
    }
}

pub fn budget_model(id: i32, user_id: i32, app_id: i32, amount: Decimal) -> budgets::Model {
    budgets::Model {
        id,
        user_id,
        app_id,
        amount,
        created_at: fixed_timestamp(),
        updated_at: None,
    }
}

pub fn order_model(id: i32, user_id: i32, app_id: i32) -> orders::Model {
    orders::Model {
        id,
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        delivery_type: "home".to_string(),
        shipping_address: None,
        user_id,
        app_id,
        created_at: fixed_timestamp(),
        updated_at: None,
    }
}

pub fn line_item_model(
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
) -> order_line_items::Model {
    order_line_items::Model {
        id,
        order_id,
        product_id,
        quantity,
        unit_price,
        total_price: unit_price * Decimal::from(quantity),
        created_at: fixed_timestamp(),
    }
}
