mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use freemarket_backend::database::{LikeRepository, ProductRepository, StoreError};
use futures_util::future::join_all;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn considering_listing_is_forced_to_zero_price() {
    let app = spawn_app();

    let (status, body) = app
        .post(
            "/products",
            None,
            json!({ "title": "Lamp", "price": 500, "description": "Desk lamp", "sellerId": "alice", "status": "considering" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], 0);
    assert_eq!(body["status"], "considering");
    assert_eq!(body["likeCount"], 0);
    assert_eq!(body["likedByMe"], false);
    assert!(body["id"].as_str().unwrap().starts_with("p_"));
}

#[tokio::test]
async fn listing_defaults_to_available() {
    let app = spawn_app();
    let id = app.create_product("alice", 1200).await;

    let (status, body) = app.get(&format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["price"], 1200);
    assert!(body.get("buyerId").is_none());
}

#[tokio::test]
async fn invalid_listings_are_rejected() {
    let app = spawn_app();

    let (status, body) = app
        .post("/products", None, json!({ "title": "X", "price": 1, "sellerId": "a", "status": "reserved" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_message"], "invalid status");

    let (status, body) = app
        .post("/products", None, json!({ "title": "X", "price": -5, "sellerId": "a" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_message"], "invalid price");
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = spawn_app();
    let (status, _) = app.get("/products/p_missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggling_a_like_flips_state_and_count() {
    let app = spawn_app();
    let bob = app.register("bob", "Bob").await;
    let id = app.create_product("alice", 300).await;

    let (status, body) = app.post("/likes", Some(&bob), json!({ "productId": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "liked": true, "likeCount": 1 }));

    let (_, body) = app.post("/likes", Some(&bob), json!({ "productId": id })).await;
    assert_eq!(body, json!({ "liked": false, "likeCount": 0 }));
    assert_eq!(app.store.like_rows(&id, "bob"), 0);

    let (status, _) = app.post("/likes", Some(&bob), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/likes", None, json!({ "productId": id })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn liked_by_me_follows_the_optional_caller() {
    let app = spawn_app();
    let bob = app.register("bob", "Bob").await;
    let carol = app.register("carol", "Carol").await;
    let id = app.create_product("alice", 300).await;
    app.post("/likes", Some(&bob), json!({ "productId": id })).await;

    let (_, listing) = app.get("/products", Some(&bob)).await;
    assert_eq!(listing[0]["likeCount"], 1);
    assert_eq!(listing[0]["likedByMe"], true);

    let (_, listing) = app.get("/products", Some(&carol)).await;
    assert_eq!(listing[0]["likedByMe"], false);

    let (status, listing) = app.get("/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing[0]["likeCount"], 1);
    assert_eq!(listing[0]["likedByMe"], false);

    // A broken token on an optional route degrades to anonymous.
    let (status, listing) = app.get("/products", Some("garbage")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing[0]["likedByMe"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_never_duplicate_a_like() {
    let app = spawn_app();
    let bob = app.register("bob", "Bob").await;
    let id = app.create_product("alice", 300).await;

    let handles = (0..10).map(|_| {
        let router = app.router.clone();
        let token = bob.clone();
        let id = id.clone();
        tokio::spawn(async move {
            common::send(router, Method::POST, "/likes", Some(&token), Some(json!({ "productId": id }))).await
        })
    });
    for result in join_all(handles).await {
        assert_eq!(result.unwrap().0, StatusCode::OK);
    }

    // Interleaved toggles may end either way, but never with two rows.
    let rows = app.store.like_rows(&id, "bob");
    assert!(rows <= 1);
    assert_eq!(app.store.count_by_product(&id).await.unwrap(), rows as i64);
}

#[tokio::test]
async fn second_purchase_is_refused() {
    let app = spawn_app();
    let bob = app.register("bob", "Bob").await;
    let carol = app.register("carol", "Carol").await;
    let id = app.create_product("alice", 900).await;

    let (status, body) = app.post("/purchase", Some(&bob), json!({ "productId": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "sold" }));

    let (status, body) = app.post("/purchase", Some(&carol), json!({ "productId": id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_message"], "already sold or not found");

    let (_, product) = app.get(&format!("/products/{id}"), None).await;
    assert_eq!(product["status"], "sold");
    assert_eq!(product["buyerId"], "bob");
}

#[tokio::test]
async fn purchase_requires_an_available_product() {
    let app = spawn_app();
    let bob = app.register("bob", "Bob").await;

    let (status, _) = app.post("/purchase", Some(&bob), json!({ "productId": "p_missing" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .post("/products", None, json!({ "title": "Chair", "price": 0, "sellerId": "alice", "status": "considering" }))
        .await;
    let id = body["id"].as_str().unwrap();
    let (status, _) = app.post("/purchase", Some(&bob), json!({ "productId": id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/purchase", None, json!({ "productId": id })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_have_a_single_winner() {
    let app = spawn_app();
    let id = app.create_product("alice", 900).await;

    let mut tokens = Vec::new();
    for n in 0..8 {
        tokens.push(app.register(&format!("buyer{n}"), "Buyer").await);
    }

    let handles = tokens.into_iter().map(|token| {
        let router = app.router.clone();
        let id = id.clone();
        tokio::spawn(async move {
            common::send(router, Method::POST, "/purchase", Some(&token), Some(json!({ "productId": id }))).await
        })
    });
    let statuses: Vec<StatusCode> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().0)
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(),
        7
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn store_level_purchase_race_has_a_single_winner() {
    let app = spawn_app();
    let id = app.create_product("alice", 900).await;
    let store = Arc::new(app.store.clone());

    let handles = (0..16).map(|n| {
        let store = store.clone();
        let id = id.clone();
        tokio::spawn(async move { store.purchase(&id, &format!("buyer{n}")).await })
    });
    let results: Vec<Result<(), StoreError>> =
        join_all(handles).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StoreError::AlreadySoldOrNotFound))
    );
}
