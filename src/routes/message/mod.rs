mod handler;
mod model;

pub use handler::{list_chat_users, list_conversation, send_message};
