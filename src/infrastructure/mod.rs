pub mod auth;
pub mod gemini;

pub use auth::{Claims, TokenError, TokenService};
pub use gemini::{GeminiClient, TextGenerator, UpstreamError};
