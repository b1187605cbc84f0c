//! Study-assistant conversation threads.
//!
//! # Invariants
//! - Newest conversations sit at the front.
//! - The active conversation id always refers to a stored conversation, or
//!   is `None`.
//! - A placeholder title is replaced by a derived one when the first user
//!   message arrives.

use super::{persist, require_user, StoreError, StoreResult, UserScoped};
use crate::model::conversation::{
    derive_title, Conversation, ConversationId, Message, MessageRole,
};
use crate::model::user::UserId;
use crate::storage::keys::DataType;
use crate::storage::user_data::UserDataStore;

const CONTAINER: &str = "conversations";

pub struct ConversationStore {
    data: UserDataStore,
    user_id: Option<UserId>,
    conversations: Vec<Conversation>,
    active_id: Option<ConversationId>,
}

impl ConversationStore {
    pub fn new(data: UserDataStore) -> Self {
        Self {
            data,
            user_id: None,
            conversations: Vec::new(),
            active_id: None,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|item| item.id == id)
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.active_id
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_id.and_then(|id| self.get(id))
    }

    /// Selects which conversation the chat view shows. `None` deselects.
    pub fn set_active_conversation(&mut self, id: Option<ConversationId>) -> StoreResult<()> {
        require_user(self.user_id.as_ref())?;
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }
        self.active_id = id;
        Ok(())
    }

    /// Starts a thread and makes it active. Blank titles become `New Chat`.
    pub fn create_conversation(&mut self, title: Option<&str>) -> StoreResult<Conversation> {
        let user_id = require_user(self.user_id.as_ref())?;
        let conversation = Conversation::new(title, self.data.now_ms());
        self.conversations.insert(0, conversation.clone());
        self.active_id = Some(conversation.id);
        self.commit(&user_id);
        Ok(conversation)
    }

    pub fn append_message(
        &mut self,
        id: ConversationId,
        role: MessageRole,
        content: &str,
    ) -> StoreResult<Message> {
        let user_id = require_user(self.user_id.as_ref())?;
        if content.trim().is_empty() {
            return Err(StoreError::InvalidInput("message content is blank"));
        }
        let message = Message {
            role,
            content: content.to_string(),
            timestamp: self.data.now_ms(),
        };

        let conversation = self.find_mut(id)?;
        let first_user_message = role == MessageRole::User
            && !conversation
                .messages
                .iter()
                .any(|existing| existing.role == MessageRole::User);
        if first_user_message && conversation.has_default_title() {
            if let Some(title) = derive_title(content) {
                conversation.title = title;
            }
        }
        conversation.messages.push(message.clone());
        self.commit(&user_id);
        Ok(message)
    }

    pub fn rename_conversation(&mut self, id: ConversationId, title: &str) -> StoreResult<()> {
        let user_id = require_user(self.user_id.as_ref())?;
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidInput("conversation title is blank"));
        }
        self.find_mut(id)?.title = title.to_string();
        self.commit(&user_id);
        Ok(())
    }

    pub fn delete_conversation(&mut self, id: ConversationId) -> StoreResult<Conversation> {
        let user_id = require_user(self.user_id.as_ref())?;
        let index = self
            .conversations
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = self.conversations.remove(index);
        if self.active_id == Some(id) {
            self.active_id = None;
        }
        self.commit(&user_id);
        Ok(removed)
    }

    fn find_mut(&mut self, id: ConversationId) -> StoreResult<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn commit(&self, user_id: &UserId) {
        persist(&self.data, user_id, DataType::AiConversations, &self.conversations);
    }
}

impl UserScoped for ConversationStore {
    fn name(&self) -> &'static str {
        CONTAINER
    }

    fn set_current_user(&mut self, user_id: &UserId) -> bool {
        if self.user_id.as_ref() == Some(user_id) {
            return false;
        }
        self.conversations = self
            .data
            .load(user_id, DataType::AiConversations, Vec::new());
        self.active_id = None;
        self.user_id = Some(user_id.clone());
        true
    }

    fn clear_user_data(&mut self) {
        self.conversations.clear();
        self.active_id = None;
        self.user_id = None;
    }

    fn current_user(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}
