//! Inbox and outbox for the signed-in user.
//!
//! Views read the last copy of the shared `messages` table. `load` and every
//! mutation re-read it, so writes made through other handles show up there.

use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::backend::{Delay, MockClient, Query, Table};
use crate::error::{BackendError, BackendResult};
use crate::models::{ListingRef, Message};

pub const DEFAULT_SUBJECT: &str = "Mensaje desde Kroma";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMessage {
    pub recipient_id: String,
    pub subject: Option<String>,
    pub content: String,
    pub listing: Option<ListingRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageBox {
    #[default]
    Inbox,
    Sent,
}

/// Latest message exchanged with one other user.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub counterpart_id: String,
    pub last_message: Message,
    pub unread: usize,
}

pub struct Messages {
    client: MockClient,
    messages: Vec<Message>,
    active: MessageBox,
}

impl Messages {
    pub fn new(client: MockClient) -> Self {
        Self {
            client,
            messages: Vec::new(),
            active: MessageBox::default(),
        }
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub async fn load(&mut self) -> BackendResult<&[Message]> {
        self.client.latency().pause(Delay::Load).await;
        self.refresh().await?;
        info!("Loaded {} messages", self.messages.len());
        Ok(self.messages.as_slice())
    }

    /// Send from the signed-in user. Content is stored trimmed.
    pub async fn send(&mut self, new: NewMessage) -> BackendResult<Message> {
        let content = new.content.trim();
        if content.is_empty() {
            return Err(BackendError::Validation(
                "El mensaje no puede estar vacío".to_string(),
            ));
        }
        if new.recipient_id.trim().is_empty() {
            return Err(BackendError::Validation(
                "Debes especificar un destinatario".to_string(),
            ));
        }
        let sender_id = self.client.session_user_id()?;

        let draft = Message {
            id: String::new(),
            sender_id,
            recipient_id: new.recipient_id.trim().to_string(),
            subject: Some(
                new.subject
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            ),
            content: content.to_string(),
            read: false,
            deleted_by_sender: false,
            deleted_by_recipient: false,
            listing: new.listing,
            created_at: self.client.now(),
        };
        let message = self
            .client
            .insert(Table::Messages, draft)
            .await
            .into_result()?;
        info!("Message {} sent to {}", message.id, message.recipient_id);
        self.refresh().await?;
        Ok(message)
    }

    pub async fn mark_as_read(&mut self, id: &str) -> BackendResult<Message> {
        let message: Message = self
            .client
            .update(&Query::by_id(Table::Messages, id), &json!({ "read": true }))
            .await
            .into_result()?;
        self.refresh().await?;
        Ok(message)
    }

    /// Hide a message from the signed-in user's side only.
    ///
    /// The other party keeps seeing it. A message sent to oneself is hidden
    /// from both boxes.
    pub async fn delete(&mut self, id: &str) -> BackendResult<Message> {
        let user_id = self.client.session_user_id()?;
        let not_found = || BackendError::NotFound("Mensaje no encontrado".to_string());

        let query = Query::by_id(Table::Messages, id);
        let message: Message = self
            .client
            .single(&query)
            .await
            .into_result()
            .map_err(|_| not_found())?;

        let mut patch = serde_json::Map::new();
        if message.sender_id == user_id {
            patch.insert("deleted_by_sender".to_string(), json!(true));
        }
        if message.recipient_id == user_id {
            patch.insert("deleted_by_recipient".to_string(), json!(true));
        }
        if patch.is_empty() {
            warn!("User {} tried to delete message {} they are not part of", user_id, id);
            return Err(not_found());
        }

        let message: Message = self.client.update(&query, &patch).await.into_result()?;
        self.refresh().await?;
        Ok(message)
    }

    pub fn received_for(&self, user_id: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.visible_to_recipient(user_id))
            .collect()
    }

    pub fn sent_for(&self, user_id: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.visible_to_sender(user_id))
            .collect()
    }

    pub fn unread_count_for(&self, user_id: &str) -> usize {
        self.received_for(user_id).iter().filter(|m| !m.read).count()
    }

    /// Empty when nobody is signed in.
    pub fn received(&self) -> Vec<&Message> {
        match self.client.session_user_id() {
            Ok(user_id) => self.received_for(&user_id),
            Err(_) => Vec::new(),
        }
    }

    pub fn sent(&self) -> Vec<&Message> {
        match self.client.session_user_id() {
            Ok(user_id) => self.sent_for(&user_id),
            Err(_) => Vec::new(),
        }
    }

    pub fn unread_count(&self) -> usize {
        match self.client.session_user_id() {
            Ok(user_id) => self.unread_count_for(&user_id),
            Err(_) => 0,
        }
    }

    pub fn active_box(&self) -> MessageBox {
        self.active
    }

    pub fn set_active_box(&mut self, active: MessageBox) {
        self.active = active;
    }

    /// Messages of the active box.
    pub fn visible(&self) -> Vec<&Message> {
        match self.active {
            MessageBox::Inbox => self.received(),
            MessageBox::Sent => self.sent(),
        }
    }

    /// One entry per counterpart, most recent first.
    pub fn conversations(&self) -> Vec<Conversation> {
        let Ok(user_id) = self.client.session_user_id() else {
            return Vec::new();
        };

        let mut by_counterpart: HashMap<&str, Conversation> = HashMap::new();
        for message in &self.messages {
            let counterpart = if message.visible_to_sender(&user_id) {
                &message.recipient_id
            } else if message.visible_to_recipient(&user_id) {
                &message.sender_id
            } else {
                continue;
            };
            let unread = usize::from(!message.read && message.recipient_id == user_id);

            by_counterpart
                .entry(counterpart.as_str())
                .and_modify(|c| {
                    if message.created_at > c.last_message.created_at {
                        c.last_message = message.clone();
                    }
                    c.unread += unread;
                })
                .or_insert_with(|| Conversation {
                    counterpart_id: counterpart.clone(),
                    last_message: message.clone(),
                    unread,
                });
        }

        let mut conversations: Vec<Conversation> = by_counterpart.into_values().collect();
        conversations.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
        conversations
    }

    /// Re-read the shared table so views include other handles' writes.
    async fn refresh(&mut self) -> BackendResult<()> {
        self.messages = self
            .client
            .select(&Query::table(Table::Messages))
            .await
            .into_result()?;
        Ok(())
    }
}
