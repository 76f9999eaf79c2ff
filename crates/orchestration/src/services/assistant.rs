//! Repricing assistant boundary.
//!
//! The assistant's output is opaque text; the core never parses its
//! internals except to pull a trailing total figure out of it.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CustomerId;
use domain::Money;

use crate::error::OrchestrationError;

/// Trait for repricing a configuration after an admin edit.
#[async_trait]
pub trait PricingAssistant: Send + Sync {
    /// Produces an updated customer-facing quote for the given prompt.
    async fn reprice(
        &self,
        customer: CustomerId,
        username: &str,
        prompt: &str,
    ) -> Result<String, OrchestrationError>;
}

/// Extracts the last money figure from assistant text.
///
/// Matches the final run of digits, tolerating spaces, commas, or dots
/// used as group separators (`"Total: 1 250 000 so'm"` -> `1250000`).
/// Absence is not an error; the total is simply omitted downstream.
pub fn extract_trailing_amount(text: &str) -> Option<Money> {
    let chars: Vec<char> = text.chars().collect();
    let mut last: Option<i64> = None;
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let mut digits = String::new();
        let mut j = i;
        while j < chars.len() {
            let c = chars[j];
            if c.is_ascii_digit() {
                digits.push(c);
                j += 1;
            } else if matches!(c, ' ' | ',' | '.')
                && j + 1 < chars.len()
                && chars[j + 1].is_ascii_digit()
            {
                j += 1;
            } else {
                break;
            }
        }

        if let Ok(value) = digits.parse::<i64>() {
            last = Some(value);
        }
        i = j;
    }

    last.map(Money::new)
}

#[derive(Debug, Default)]
struct CannedState {
    replies: VecDeque<String>,
    fail: bool,
    calls: Vec<(CustomerId, String)>,
}

/// In-memory assistant for testing: replays queued replies, or echoes
/// the prompt when the queue is empty.
#[derive(Debug, Clone, Default)]
pub struct CannedAssistant {
    state: Arc<RwLock<CannedState>>,
}

impl CannedAssistant {
    /// Creates an assistant with an empty reply queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next reprice call.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.state.write().unwrap().replies.push_back(reply.into());
    }

    /// Configures the assistant to fail on the next call.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }

    /// Returns every recorded call as `(customer, prompt)`.
    pub fn calls(&self) -> Vec<(CustomerId, String)> {
        self.state.read().unwrap().calls.clone()
    }
}

#[async_trait]
impl PricingAssistant for CannedAssistant {
    async fn reprice(
        &self,
        customer: CustomerId,
        _username: &str,
        prompt: &str,
    ) -> Result<String, OrchestrationError> {
        let mut state = self.state.write().unwrap();

        if state.fail {
            return Err(OrchestrationError::Assistant(
                "assistant unavailable".to_string(),
            ));
        }

        state.calls.push((customer, prompt.to_string()));
        Ok(state
            .replies
            .pop_front()
            .unwrap_or_else(|| prompt.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_number() {
        assert_eq!(
            extract_trailing_amount("Total: 45000"),
            Some(Money::new(45000))
        );
    }

    #[test]
    fn test_extract_takes_the_last_figure() {
        let text = "2x plov (22500 each)\nTotal: 45 000 so'm";
        assert_eq!(extract_trailing_amount(text), Some(Money::new(45000)));
    }

    #[test]
    fn test_extract_with_separators() {
        assert_eq!(
            extract_trailing_amount("Jami: 1 250 000"),
            Some(Money::new(1250000))
        );
        assert_eq!(
            extract_trailing_amount("Total 1,250,000 sum"),
            Some(Money::new(1250000))
        );
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract_trailing_amount("no numbers here"), None);
        assert_eq!(extract_trailing_amount(""), None);
    }

    #[tokio::test]
    async fn test_canned_replies_and_echo() {
        let assistant = CannedAssistant::new();
        assistant.push_reply("Updated: total 50000");

        let customer = CustomerId::new(1);
        let first = assistant.reprice(customer, "u", "2x plov").await.unwrap();
        assert_eq!(first, "Updated: total 50000");

        let second = assistant.reprice(customer, "u", "2x plov").await.unwrap();
        assert_eq!(second, "2x plov");

        assert_eq!(assistant.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_injection() {
        let assistant = CannedAssistant::new();
        assistant.set_fail(true);
        let result = assistant.reprice(CustomerId::new(1), "u", "x").await;
        assert!(matches!(result, Err(OrchestrationError::Assistant(_))));
    }
}
