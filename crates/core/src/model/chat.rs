//! Buyer/seller chats and their messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, lenient};
use crate::types::{ChatId, MessageId, ProductId, UserId};

/// Chat document at `chats/{id}`, about one product between one buyer and
/// one seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Document key.
    #[serde(skip_serializing, default)]
    pub id: ChatId,
    /// User who opened the chat.
    pub buyer_id: UserId,
    /// Owner of the product's shop.
    pub seller_id: UserId,
    /// Product the chat is about.
    pub product_id: ProductId,
    /// When the chat was opened.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last activity; touched on every message.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which side of a chat a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatRole {
    /// The user asked about the product.
    Buyer,
    /// The user owns the product.
    Seller,
}

impl Chat {
    /// Open a chat.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SelfChat`] when buyer and seller are the
    /// same user.
    pub fn open(
        buyer_id: UserId,
        seller_id: UserId,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if buyer_id == seller_id {
            return Err(ValidationError::SelfChat);
        }
        Ok(Self {
            id: ChatId::default(),
            buyer_id,
            seller_id,
            product_id,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// The role `user` plays in this chat, if any.
    #[must_use]
    pub fn role_of(&self, user: &UserId) -> Option<ChatRole> {
        if &self.seller_id == user {
            Some(ChatRole::Seller)
        } else if &self.buyer_id == user {
            Some(ChatRole::Buyer)
        } else {
            None
        }
    }

    /// The other participant, from `user`'s point of view.
    #[must_use]
    pub fn partner_of(&self, user: &UserId) -> Option<&UserId> {
        match self.role_of(user)? {
            ChatRole::Buyer => Some(&self.seller_id),
            ChatRole::Seller => Some(&self.buyer_id),
        }
    }

    /// Last activity, falling back to creation time.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Message document at `chats/{chatId}/messages/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Document key.
    #[serde(skip_serializing, default)]
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Message text.
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
    /// When the message was sent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Outgoing message text, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft(String);

impl MessageDraft {
    /// Validate message text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyMessage`] if nothing is left after
    /// trimming.
    pub fn new(content: &str) -> Result<Self, ValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(Self(content.to_owned()))
    }

    /// The message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stamp the message for sending.
    #[must_use]
    pub fn into_message(self, sender_id: UserId, now: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::default(),
            sender_id,
            content: self.0,
            timestamp: Some(now),
        }
    }
}

/// Sort messages oldest first. Messages without a timestamp sort first;
/// ties keep their input order.
pub fn sort_messages(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.timestamp);
}
