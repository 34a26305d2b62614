// Product catalog lookup

pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::{get_product_handler, list_products_handler};
pub use models::Product;
pub use repository::{MemoryProductStore, PgProductStore, ProductStore};
