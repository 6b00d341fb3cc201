mod like;
mod message;
mod product;
mod user;

pub use like::{LikeRepository, PgLikeRepository};
pub use message::{MessageRepository, PgMessageRepository};
pub use product::{PgProductRepository, ProductRepository};
pub use user::{PgUserRepository, UserRepository};
