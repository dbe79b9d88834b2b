use axum::{
    routing::{delete, get, post},
    Router,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::auth::JwtContext;
use storefront_backend::handlers;
use storefront_backend::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let state = AppState {
        db: std::sync::Arc::new(db),
        jwt: JwtContext::new(&jwt_secret),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/orders", post(handlers::orders::place_order))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route(
            "/orders/user/{user_id}",
            get(handlers::orders::get_orders_for_user),
        )
        .route(
            "/orders/app/{app_id}",
            get(handlers::orders::get_orders_for_app),
        )
        .route(
            "/apps",
            post(handlers::apps::create_app).get(handlers::apps::list_my_apps),
        )
        .route("/apps/slug/{slug}", get(handlers::apps::get_app_by_slug))
        .route(
            "/apps/{app_id}/categories",
            post(handlers::categories::create_category).get(handlers::categories::list_categories),
        )
        .route(
            "/apps/{app_id}/products",
            get(handlers::products::list_products_for_app),
        )
        .route(
            "/categories/{category_id}/products",
            post(handlers::products::create_product),
        )
        .route("/products/{id}", get(handlers::products::get_product))
        .route("/budgets/{app_id}", get(handlers::budgets::get_budget))
        .route(
            "/budgets/{app_id}/credit",
            post(handlers::budgets::credit_budget),
        )
        .route(
            "/cart/{app_id}",
            get(handlers::carts::get_cart).delete(handlers::carts::clear_cart),
        )
        .route("/cart/{app_id}/items", post(handlers::carts::add_cart_item))
        .route(
            "/cart/{app_id}/items/{product_id}",
            delete(handlers::carts::remove_cart_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!(
        "Server listening on {}",
        listener.local_addr().expect("listener has no local addr")
    );

    axum::serve(listener, app).await.expect("Server error");
}

async fn health() -> &'static str {
    "ok"
}
