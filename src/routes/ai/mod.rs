mod handler;
mod model;

pub use handler::product_summary;
