//! Chat repository: buyer/seller conversations and their messages.

use chrono::Utc;
use futures::future::try_join;
use tracing::instrument;

use bozor_core::model::chat::sort_messages;
use bozor_core::{Chat, ChatId, ChatRole, Message, MessageDraft, MessageId, ProductId, UserId};

use super::{
    CHATS, RepositoryError, from_document, from_documents, messages_path, to_fields, touch,
    update_existing,
};
use crate::store::{DocumentStore, FieldFilter, Fields};

/// A chat together with the role the listing user plays in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChat {
    /// The chat.
    pub chat: Chat,
    /// The user's side of it.
    pub role: ChatRole,
}

/// Repository for chats.
pub struct ChatRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Return the chat between `buyer` and `seller` about `product`,
    /// creating it if none exists.
    ///
    /// Lookup and insert are separate requests, so two racing calls can both
    /// create a chat. Callers always get a usable chat id back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if buyer and seller are the
    /// same user.
    #[instrument(skip(self), fields(buyer = %buyer, seller = %seller, product = %product))]
    pub async fn create_chat(
        &self,
        buyer: &UserId,
        seller: &UserId,
        product: &ProductId,
    ) -> Result<ChatId, RepositoryError> {
        let chat = Chat::open(buyer.clone(), seller.clone(), product.clone(), Utc::now())?;

        let filters = [
            FieldFilter::eq("buyerId", buyer.as_str()),
            FieldFilter::eq("sellerId", seller.as_str()),
            FieldFilter::eq("productId", product.as_str()),
        ];
        if let Some(existing) = self.store.query(CHATS, &filters).await?.into_iter().next() {
            return Ok(ChatId::new(existing.id));
        }

        let id = ChatId::new(self.store.add(CHATS, to_fields(&chat)?).await?);
        tracing::info!(chat_id = %id, "Chat opened");
        Ok(id)
    }

    /// Every chat `user` takes part in, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a query fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn get_user_chats(&self, user: &UserId) -> Result<Vec<UserChat>, RepositoryError> {
        let buyer_filter = [FieldFilter::eq("buyerId", user.as_str())];
        let seller_filter = [FieldFilter::eq("sellerId", user.as_str())];
        let (as_buyer, as_seller) = try_join(
            self.store.query(CHATS, &buyer_filter),
            self.store.query(CHATS, &seller_filter),
        )
        .await?;

        let mut chats: Vec<UserChat> = Vec::new();
        for chat in from_documents::<Chat>(CHATS, as_buyer.into_iter().chain(as_seller).collect()) {
            if chats.iter().any(|c| c.chat.id == chat.id) {
                continue;
            }
            if let Some(role) = chat.role_of(user) {
                chats.push(UserChat { chat, role });
            }
        }
        chats.sort_by(|a, b| b.chat.last_activity().cmp(&a.chat.last_activity()));
        Ok(chats)
    }

    /// One chat by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    pub async fn get_chat(&self, id: &ChatId) -> Result<Option<Chat>, RepositoryError> {
        self.store
            .get(CHATS, id.as_str())
            .await?
            .map(|doc| from_document(CHATS, doc))
            .transpose()
    }

    /// Post a message to a chat and bump the chat's last activity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the chat does not exist, or
    /// `RepositoryError::Forbidden` if `sender` is not a participant.
    #[instrument(skip(self, draft), fields(chat_id = %chat_id, sender = %sender))]
    pub async fn send_message(
        &self,
        chat_id: &ChatId,
        sender: &UserId,
        draft: MessageDraft,
    ) -> Result<Message, RepositoryError> {
        let chat = self
            .get_chat(chat_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{CHATS}/{chat_id}")))?;
        if chat.role_of(sender).is_none() {
            return Err(RepositoryError::Forbidden(format!(
                "{sender} is not part of chat {chat_id}"
            )));
        }

        update_existing(self.store, CHATS, chat_id.as_str(), touch(Fields::new())).await?;
        let mut message = draft.into_message(sender.clone(), Utc::now());
        let id = self
            .store
            .add(&messages_path(chat_id.as_str()), to_fields(&message)?)
            .await?;
        message.id = MessageId::new(id);
        Ok(message)
    }

    /// Messages of a chat, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn get_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, RepositoryError> {
        let path = messages_path(chat_id.as_str());
        let docs = self.store.query(&path, &[]).await?;
        let mut messages: Vec<Message> = from_documents(&path, docs);
        sort_messages(&mut messages);
        Ok(messages)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_create_chat_reuses_existing() {
        let store = InMemoryStore::new();
        let repo = ChatRepository::new(&store);
        let (buyer, seller) = (UserId::new("buyer"), UserId::new("seller"));
        let product = ProductId::new("p1");

        let first = repo.create_chat(&buyer, &seller, &product).await.unwrap();
        let again = repo.create_chat(&buyer, &seller, &product).await.unwrap();
        assert_eq!(first, again);

        let other = repo
            .create_chat(&buyer, &seller, &ProductId::new("p2"))
            .await
            .unwrap();
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_self_chat_rejected() {
        let store = InMemoryStore::new();
        let repo = ChatRepository::new(&store);
        let me = UserId::new("me");
        assert!(matches!(
            repo.create_chat(&me, &me, &ProductId::new("p1")).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_user_chats_carry_roles() {
        let store = InMemoryStore::new();
        let repo = ChatRepository::new(&store);
        let (a, b, c) = (UserId::new("a"), UserId::new("b"), UserId::new("c"));

        repo.create_chat(&a, &b, &ProductId::new("p1")).await.unwrap();
        repo.create_chat(&c, &a, &ProductId::new("p2")).await.unwrap();

        let chats = repo.get_user_chats(&a).await.unwrap();
        assert_eq!(chats.len(), 2);
        assert!(chats.iter().any(|c| c.role == ChatRole::Buyer && c.chat.seller_id.as_str() == "b"));
        assert!(chats.iter().any(|c| c.role == ChatRole::Seller && c.chat.buyer_id.as_str() == "c"));
        assert_eq!(repo.get_user_chats(&b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_messages_round_trip_in_order() {
        let store = InMemoryStore::new();
        let repo = ChatRepository::new(&store);
        let (buyer, seller) = (UserId::new("buyer"), UserId::new("seller"));
        let chat = repo.create_chat(&buyer, &seller, &ProductId::new("p1")).await.unwrap();

        repo.send_message(&chat, &buyer, MessageDraft::new("Есть в наличии?").unwrap())
            .await
            .unwrap();
        repo.send_message(&chat, &seller, MessageDraft::new("Да").unwrap())
            .await
            .unwrap();

        let messages = repo.get_messages(&chat).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["Есть в наличии?", "Да"]);
        assert_eq!(messages[1].sender_id, seller);

        let stored = repo.get_chat(&chat).await.unwrap().unwrap();
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_outsider_cannot_post() {
        let store = InMemoryStore::new();
        let repo = ChatRepository::new(&store);
        let chat = repo
            .create_chat(&UserId::new("buyer"), &UserId::new("seller"), &ProductId::new("p1"))
            .await
            .unwrap();

        assert!(matches!(
            repo.send_message(&chat, &UserId::new("stranger"), MessageDraft::new("hi").unwrap())
                .await,
            Err(RepositoryError::Forbidden(_))
        ));
        assert!(matches!(
            repo.send_message(&ChatId::new("gone"), &UserId::new("buyer"), MessageDraft::new("hi").unwrap())
                .await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(repo.get_messages(&chat).await.unwrap().is_empty());
    }
}
