pub mod apps;
pub mod budgets;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
