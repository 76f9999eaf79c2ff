//! Chat transport boundary and a recording in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ChatId, MessageId, MessageRef, ThreadId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport failures. Logged and treated as best-effort by every flow
/// except the order-form renderer, which falls back to a fresh send on a
/// failed edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Sending a message failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Editing a previously sent message failed.
    #[error("edit failed: {0}")]
    Edit(String),

    /// Deleting a previously sent message failed.
    #[error("delete failed: {0}")]
    Delete(String),

    /// Acknowledging a button press failed.
    #[error("callback ack failed: {0}")]
    Ack(String),
}

/// One inline-keyboard button carrying a callback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    /// Creates a button.
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// An inline keyboard: rows of buttons attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Creates a keyboard from rows of buttons.
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// Creates a keyboard with a single row.
    pub fn row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    /// Returns every callback payload on the keyboard, row by row.
    pub fn payloads(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.data.as_str())
            .collect()
    }
}

/// Boundary to the chat platform.
///
/// All calls are fire-and-forget from the core's perspective, except
/// that returned message ids must be captured for later edit, delete,
/// and correlation.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a message, optionally into a thread and with a keyboard.
    async fn send(
        &self,
        chat: ChatId,
        thread: Option<ThreadId>,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, TransportError>;

    /// Edits the text and keyboard of a previously sent message.
    async fn edit(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError>;

    /// Deletes a previously sent message.
    async fn delete(&self, target: MessageRef) -> Result<(), TransportError>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn ack_callback(&self, callback_id: &str) -> Result<(), TransportError>;

    /// Sends a message with a transient reply keyboard asking the
    /// customer to share a contact or location.
    async fn request_contact(&self, chat: ChatId, text: &str)
    -> Result<MessageId, TransportError>;
}

/// A message captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatId,
    pub thread: Option<ThreadId>,
    pub id: MessageId,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// An edit captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedMessage {
    pub target: MessageRef,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<SentMessage>,
    edits: Vec<EditedMessage>,
    deleted: Vec<MessageRef>,
    acks: Vec<String>,
    contact_requests: Vec<(ChatId, String)>,
    next_id: i32,
    fail_send: bool,
    fail_edit: bool,
    fail_delete: bool,
}

/// In-memory transport for testing: records every call and hands out
/// sequential message ids.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingTransport {
    /// Creates a new recording transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures send calls to fail.
    pub fn set_fail_send(&self, fail: bool) {
        self.state.write().unwrap().fail_send = fail;
    }

    /// Configures edit calls to fail.
    pub fn set_fail_edit(&self, fail: bool) {
        self.state.write().unwrap().fail_edit = fail;
    }

    /// Configures delete calls to fail.
    pub fn set_fail_delete(&self, fail: bool) {
        self.state.write().unwrap().fail_delete = fail;
    }

    /// Returns every sent message, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns the messages sent to a given chat, in order.
    pub fn sent_to(&self, chat: ChatId) -> Vec<SentMessage> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|m| m.chat == chat)
            .cloned()
            .collect()
    }

    /// Returns the most recent message sent to a given chat.
    pub fn last_sent_to(&self, chat: ChatId) -> Option<SentMessage> {
        self.sent_to(chat).pop()
    }

    /// Returns every edit, in order.
    pub fn edits(&self) -> Vec<EditedMessage> {
        self.state.read().unwrap().edits.clone()
    }

    /// Returns every deleted message reference, in order.
    pub fn deleted(&self) -> Vec<MessageRef> {
        self.state.read().unwrap().deleted.clone()
    }

    /// Returns every acknowledged callback id.
    pub fn acks(&self) -> Vec<String> {
        self.state.read().unwrap().acks.clone()
    }

    /// Returns every contact request.
    pub fn contact_requests(&self) -> Vec<(ChatId, String)> {
        self.state.read().unwrap().contact_requests.clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(
        &self,
        chat: ChatId,
        thread: Option<ThreadId>,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let mut state = self.state.write().unwrap();
        if state.fail_send {
            return Err(TransportError::Send("injected failure".to_string()));
        }
        state.next_id += 1;
        let id = MessageId::new(state.next_id);
        state.sent.push(SentMessage {
            chat,
            thread,
            id,
            text: text.to_string(),
            keyboard,
        });
        Ok(id)
    }

    async fn edit(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError> {
        let mut state = self.state.write().unwrap();
        if state.fail_edit {
            return Err(TransportError::Edit("injected failure".to_string()));
        }
        state.edits.push(EditedMessage {
            target,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn delete(&self, target: MessageRef) -> Result<(), TransportError> {
        let mut state = self.state.write().unwrap();
        if state.fail_delete {
            return Err(TransportError::Delete("injected failure".to_string()));
        }
        state.deleted.push(target);
        Ok(())
    }

    async fn ack_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        let mut state = self.state.write().unwrap();
        state.acks.push(callback_id.to_string());
        Ok(())
    }

    async fn request_contact(
        &self,
        chat: ChatId,
        text: &str,
    ) -> Result<MessageId, TransportError> {
        let mut state = self.state.write().unwrap();
        if state.fail_send {
            return Err(TransportError::Send("injected failure".to_string()));
        }
        state.next_id += 1;
        let id = MessageId::new(state.next_id);
        state.contact_requests.push((chat, text.to_string()));
        state.sent.push(SentMessage {
            chat,
            thread: None,
            id,
            text: text.to_string(),
            keyboard: None,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_records_and_assigns_sequential_ids() {
        let transport = RecordingTransport::new();
        let chat = ChatId::new(10);

        let a = transport.send(chat, None, "first", None).await.unwrap();
        let b = transport.send(chat, None, "second", None).await.unwrap();
        assert_ne!(a, b);

        let sent = transport.sent_to(chat);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, "first");
        assert_eq!(sent[1].text, "second");
    }

    #[tokio::test]
    async fn test_injected_send_failure() {
        let transport = RecordingTransport::new();
        transport.set_fail_send(true);

        let result = transport.send(ChatId::new(1), None, "x", None).await;
        assert!(matches!(result, Err(TransportError::Send(_))));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_edit_and_delete_recorded() {
        let transport = RecordingTransport::new();
        let chat = ChatId::new(10);
        let id = transport.send(chat, None, "text", None).await.unwrap();
        let target = MessageRef::new(chat, id);

        transport.edit(target, "updated", None).await.unwrap();
        transport.delete(target).await.unwrap();

        assert_eq!(transport.edits()[0].text, "updated");
        assert_eq!(transport.deleted(), vec![target]);
    }

    #[tokio::test]
    async fn test_request_contact_recorded_with_message_id() {
        let transport = RecordingTransport::new();
        let chat = ChatId::new(10);

        let id = transport
            .request_contact(chat, "Share your contact")
            .await
            .unwrap();
        assert_eq!(
            transport.contact_requests(),
            vec![(chat, "Share your contact".to_string())]
        );
        // The request occupies a message id like any other send.
        let next = transport.send(chat, None, "x", None).await.unwrap();
        assert_ne!(id, next);
    }

    #[tokio::test]
    async fn test_keyboard_payloads() {
        let keyboard = Keyboard::new(vec![
            vec![Button::new("Yes", "approve"), Button::new("No", "decline")],
            vec![Button::new("Back", "back")],
        ]);
        assert_eq!(keyboard.payloads(), vec!["approve", "decline", "back"]);
    }
}
