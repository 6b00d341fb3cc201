mod handler;
mod model;

pub use handler::toggle_like;
