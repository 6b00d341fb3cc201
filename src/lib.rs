use std::sync::Arc;

use database::{LikeRepository, MessageRepository, ProductRepository, UserRepository};
use infrastructure::{TextGenerator, TokenService};

pub mod config;
pub mod database;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod models;
pub mod router;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub bcrypt_cost: u32,
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub text_generator: Arc<dyn TextGenerator>,
}
