mod message;
mod product;
mod user;

pub use message::Message;
pub use product::{InvalidStatus, Product, ProductStatus};
pub use user::{User, UserProfile};
