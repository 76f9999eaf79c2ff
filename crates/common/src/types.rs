use serde::{Deserialize, Serialize};

/// Unique identifier for a customer.
///
/// Wraps the numeric identifier handed to us by the chat transport so
/// customer ids cannot be mixed up with chat or message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

impl CustomerId {
    /// Creates a customer ID from a raw transport identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<CustomerId> for i64 {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

/// Unique identifier for a chat (customer, admin, or confirmed-orders channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    /// Creates a chat ID from a raw transport identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ChatId> for i64 {
    fn from(id: ChatId) -> Self {
        id.0
    }
}

/// Identifier of a thread (topic) inside a channel chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(i32);

impl ThreadId {
    /// Creates a thread ID from a raw transport identifier.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ThreadId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Identifier of a message within a chat.
///
/// Message ids are only unique per chat; see [`MessageRef`] for a
/// globally addressable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i32);

impl MessageId {
    /// Creates a message ID from a raw transport identifier.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MessageId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// A chat + message pair addressing a previously sent message.
///
/// Captured from every outbound send so the message can later be edited
/// or deleted instead of duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message: MessageId,
}

impl MessageRef {
    /// Creates a message reference.
    pub fn new(chat: ChatId, message: MessageId) -> Self {
        Self { chat, message }
    }
}

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chat, self.message)
    }
}

/// Generated order identifier of the form `DDMMYYYY-NN`.
///
/// The sequence part resets daily; uniqueness within a calendar day is
/// guaranteed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an order ID from a formatted string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the order ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_id_roundtrip() {
        let id = CustomerId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(CustomerId::from(42), id);
    }

    #[test]
    fn message_ref_display() {
        let msg = MessageRef::new(ChatId::new(-100), MessageId::new(7));
        assert_eq!(msg.to_string(), "-100/7");
    }

    #[test]
    fn order_id_string_conversion() {
        let id = OrderId::new("06082026-01");
        assert_eq!(id.as_str(), "06082026-01");

        let id2: OrderId = "06082026-02".into();
        assert_eq!(id2.as_str(), "06082026-02");
    }

    #[test]
    fn id_serialization_is_transparent() {
        let chat = ChatId::new(-1001234);
        let json = serde_json::to_string(&chat).unwrap();
        assert_eq!(json, "-1001234");
        let back: ChatId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chat);

        let order = OrderId::new("06082026-03");
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, "\"06082026-03\"");
    }
}
