mod handler;
mod model;

pub use handler::{get_me, get_user, login, signup};
