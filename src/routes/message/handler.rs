use axum::extract::{Extension, Json, State};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::Identity,
    models::Message,
    routes::{ApiJson, ApiQuery, require_fields},
    utils::new_message_id,
};

use super::model::{ChatUser, ChatUsersQuery, ConversationQuery, SendMessageRequest};

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> AppResult<Json<Message>> {
    require_fields(
        &[&req.to_user_id, &req.product_id, &req.body],
        "toUserId, productId and body are required",
    )?;

    let message = Message {
        id: new_message_id(),
        product_id: req.product_id,
        from_user_id: identity.user_id,
        to_user_id: req.to_user_id,
        body: req.body,
        created_at: Utc::now(),
    };

    state
        .messages
        .create(&message)
        .await
        .map_err(AppError::storage("send message"))?;

    tracing::debug!(
        "Message {} on {} from {} to {}",
        message.id,
        message.product_id,
        message.from_user_id,
        message.to_user_id
    );
    Ok(Json(message))
}

#[axum::debug_handler]
pub async fn list_conversation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<ConversationQuery>,
) -> AppResult<Json<Vec<Message>>> {
    require_fields(
        &[&query.other_user_id, &query.product_id],
        "otherUserId and productId are required",
    )?;

    let messages = state
        .messages
        .list_conversation(&identity.user_id, &query.other_user_id, &query.product_id)
        .await
        .map_err(AppError::storage("list messages"))?;

    Ok(Json(messages))
}

/// Everyone the caller has talked to about one product, with display names.
/// Participants whose account cannot be loaded are left out.
#[axum::debug_handler]
pub async fn list_chat_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<ChatUsersQuery>,
) -> AppResult<Json<Vec<ChatUser>>> {
    require_fields(&[&query.product_id], "productId is required")?;

    let user_ids = state
        .messages
        .list_chat_users_by_product(&identity.user_id, &query.product_id)
        .await
        .map_err(AppError::storage("list chat users"))?;

    let mut users = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        match state.users.find_by_id(&user_id).await {
            Ok(user) => users.push(ChatUser {
                user_id,
                display_name: user.display_name,
            }),
            Err(e) => tracing::debug!("Skipping chat participant {}: {}", user_id, e),
        }
    }

    Ok(Json(users))
}
