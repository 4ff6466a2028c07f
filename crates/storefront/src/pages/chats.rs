//! Chat list and chat thread screens.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;

use bozor_core::{Chat, ChatId, ChatRole, Message, MessageDraft, Product, UserId, UserProfile};

use super::signed_in;
use crate::db::{ChatRepository, ProductRepository, UserChat, UserRepository};
use crate::error::{AppError, Result};
use crate::services::ChatPoller;
use crate::state::AppState;

/// Label shown in place of a deleted product.
pub const FALLBACK_PRODUCT_NAME: &str = "Товар";

/// One row of the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    /// Chat to open.
    pub chat_id: ChatId,
    /// The viewer's side.
    pub role: ChatRole,
    /// The other participant's name.
    pub partner_name: String,
    /// What the chat is about.
    pub product_name: String,
    /// Last message or creation time.
    pub last_activity: Option<DateTime<Utc>>,
}

/// An open chat.
#[derive(Debug, Clone)]
pub struct ChatThread {
    /// The chat.
    pub chat: Chat,
    /// The viewer's side.
    pub role: ChatRole,
    /// The other participant's name.
    pub partner_name: String,
    /// The product, if it still exists.
    pub product: Option<Product>,
    /// Messages, oldest first.
    pub messages: Vec<Message>,
}

async fn partner_name(users: &UserRepository<'_>, partner: Option<&UserId>) -> Result<String> {
    let profile = match partner {
        Some(uid) => users.get_profile(uid).await?,
        None => None,
    };
    Ok(profile.map_or_else(
        || UserProfile::FALLBACK_NAME.to_string(),
        |p| p.name_or_fallback().to_string(),
    ))
}

async fn summarize(state: &AppState, viewer: &UserId, entry: UserChat) -> Result<ChatSummary> {
    let users = UserRepository::new(state.store());
    let partner_name = partner_name(&users, entry.chat.partner_of(viewer)).await?;
    let product_name = ProductRepository::new(state.store())
        .get_product(&entry.chat.product_id)
        .await?
        .map_or_else(|| FALLBACK_PRODUCT_NAME.to_string(), |p| p.name);
    Ok(ChatSummary {
        chat_id: entry.chat.id.clone(),
        role: entry.role,
        partner_name,
        product_name,
        last_activity: entry.chat.last_activity(),
    })
}

/// The signed-in user's chats, most recently active first.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out.
pub async fn list(state: &AppState) -> Result<Vec<ChatSummary>> {
    let user = signed_in(state)?;
    let chats = ChatRepository::new(state.store())
        .get_user_chats(&user.uid)
        .await?;
    try_join_all(chats.into_iter().map(|entry| summarize(state, &user.uid, entry))).await
}

/// Open a chat thread.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown chat, or `AppError::Forbidden`
/// if the viewer is not a participant.
pub async fn open(state: &AppState, chat_id: &ChatId) -> Result<ChatThread> {
    let user = signed_in(state)?;
    let repo = ChatRepository::new(state.store());
    let chat = repo
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chat {chat_id}")))?;
    let role = chat
        .role_of(&user.uid)
        .ok_or_else(|| AppError::Forbidden(format!("not part of chat {chat_id}")))?;

    let users = UserRepository::new(state.store());
    let partner_name = partner_name(&users, chat.partner_of(&user.uid)).await?;
    let product = ProductRepository::new(state.store())
        .get_product(&chat.product_id)
        .await?;
    let messages = repo.get_messages(chat_id).await?;

    Ok(ChatThread {
        chat,
        role,
        partner_name,
        product,
        messages,
    })
}

/// Send a message. Blank messages are rejected before any request.
///
/// # Errors
///
/// Returns a validation error for a blank message, or a forbidden error if
/// the viewer is not a participant.
pub async fn send(state: &AppState, chat_id: &ChatId, text: &str) -> Result<Message> {
    let user = signed_in(state)?;
    let draft = MessageDraft::new(text)?;
    Ok(ChatRepository::new(state.store())
        .send_message(chat_id, &user.uid, draft)
        .await?)
}

/// Keep an open chat's messages fresh until the returned poller is dropped.
#[must_use]
pub fn watch(state: &AppState, chat_id: &ChatId) -> ChatPoller {
    ChatPoller::start(state.store_handle(), chat_id.clone(), state.chat_poll_interval())
}
