pub use super::app_users::Entity as AppUsers;
pub use super::apps::Entity as Apps;
pub use super::budgets::Entity as Budgets;
pub use super::cart_items::Entity as CartItems;
pub use super::categories::Entity as Categories;
pub use super::order_line_items::Entity as OrderLineItems;
pub use super::orders::Entity as Orders;
pub use super::products::Entity as Products;
pub use super::users::Entity as Users;
