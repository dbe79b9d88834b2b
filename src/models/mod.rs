pub mod app;
pub mod budget;
pub mod cart;
pub mod category;
pub mod error;
pub mod order;
pub mod product;
