use axum::{
    Router,
    handler::Handler,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    config::CorsPolicy,
    middleware::{log_errors, optional_auth, require_auth},
    routes::{ai, like, message, product, user},
};

fn cors_layer(policy: CorsPolicy) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin.to_str().map(|o| policy.allows(o)).unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn create_router(state: AppState, cors: CorsPolicy) -> Router {
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .route("/users/{user_id}", get(user::get_user))
        .route(
            "/products",
            get(product::list_products.layer(from_fn_with_state(state.clone(), optional_auth)))
                .post(product::create_product),
        )
        .route(
            "/products/{product_id}",
            get(product::get_product.layer(from_fn_with_state(state.clone(), optional_auth))),
        )
        .route("/ai/product-summary", post(ai::product_summary));

    let protected_routes = Router::new()
        .route("/me", get(user::get_me))
        .route("/likes", post(like::toggle_like))
        .route("/purchase", post(product::purchase))
        .route(
            "/messages",
            get(message::list_conversation).post(message::send_message),
        )
        .route("/product-chats", get(message::list_chat_users))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors))
                .layer(from_fn(log_errors)),
        )
        .with_state(state)
}
