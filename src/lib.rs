// src/lib.rs

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::JwtContext;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub jwt: JwtContext,
}

pub mod entities {
    pub mod prelude;
    pub mod app_users;
    pub mod apps;
    pub mod budgets;
    pub mod cart_items;
    pub mod categories;
    pub mod order_line_items;
    pub mod orders;
    pub mod products;
    pub mod users;
}

pub mod services {
    pub mod app_access;
    pub mod budget_ledger;
    pub mod order_placement;
}

pub mod auth;
pub mod models;
pub mod handlers;
