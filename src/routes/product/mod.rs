mod handler;
mod model;

pub use handler::{create_product, get_product, list_products, purchase};
pub use model::{CreateProductRequest, PurchaseRequest, PurchaseResponse};
