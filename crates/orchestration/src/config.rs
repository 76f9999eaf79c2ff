//! Orchestrator configuration loaded from environment variables.

use std::time::Duration;

use common::{ChatId, ThreadId};

/// Operator configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `ORDERS_ADMIN_CHAT` — fulfillment channel chat id (default: `0`)
/// - `ORDERS_ADMIN_THREAD` — optional thread id in that channel
/// - `ORDERS_CONFIRMED_CHAT` — confirmed-orders channel chat id (default: `0`)
/// - `ORDERS_CONFIRMED_THREAD` — optional thread id in that channel
/// - `REMINDERS_ENABLED` — global reminder switch (default: `true`)
/// - `REMINDER_DELAY_SECS` — requested re-engagement delay (default: `1800`)
/// - `REMINDER_DELAY_MIN_SECS` / `REMINDER_DELAY_MAX_SECS` — clamp bounds
///   applied to the requested delay (defaults: `300` / `86400`)
/// - `INVENTORY_TIMEOUT_SECS` — bound on every inventory call (default: `5`)
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_chat: ChatId,
    pub admin_thread: Option<ThreadId>,
    pub confirmed_chat: ChatId,
    pub confirmed_thread: Option<ThreadId>,
    pub reminders_enabled: bool,
    pub reminder_delay: Duration,
    pub reminder_delay_min: Duration,
    pub reminder_delay_max: Duration,
    pub inventory_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            admin_chat: env_i64("ORDERS_ADMIN_CHAT")
                .map(ChatId::new)
                .unwrap_or(defaults.admin_chat),
            admin_thread: env_i32("ORDERS_ADMIN_THREAD").map(ThreadId::new),
            confirmed_chat: env_i64("ORDERS_CONFIRMED_CHAT")
                .map(ChatId::new)
                .unwrap_or(defaults.confirmed_chat),
            confirmed_thread: env_i32("ORDERS_CONFIRMED_THREAD").map(ThreadId::new),
            reminders_enabled: env_bool("REMINDERS_ENABLED")
                .unwrap_or(defaults.reminders_enabled),
            reminder_delay: env_secs("REMINDER_DELAY_SECS").unwrap_or(defaults.reminder_delay),
            reminder_delay_min: env_secs("REMINDER_DELAY_MIN_SECS")
                .unwrap_or(defaults.reminder_delay_min),
            reminder_delay_max: env_secs("REMINDER_DELAY_MAX_SECS")
                .unwrap_or(defaults.reminder_delay_max),
            inventory_timeout: env_secs("INVENTORY_TIMEOUT_SECS")
                .unwrap_or(defaults.inventory_timeout),
        }
    }

    /// Returns the reminder delay clamped to the configured bounds.
    pub fn clamped_reminder_delay(&self) -> Duration {
        self.reminder_delay
            .clamp(self.reminder_delay_min, self.reminder_delay_max)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_chat: ChatId::new(0),
            admin_thread: None,
            confirmed_chat: ChatId::new(0),
            confirmed_thread: None,
            reminders_enabled: true,
            reminder_delay: Duration::from_secs(1800),
            reminder_delay_min: Duration::from_secs(300),
            reminder_delay_max: Duration::from_secs(86400),
            inventory_timeout: Duration::from_secs(5),
        }
    }
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_i32(key: &str) -> Option<i32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.admin_chat, ChatId::new(0));
        assert!(config.admin_thread.is_none());
        assert!(config.reminders_enabled);
        assert_eq!(config.reminder_delay, Duration::from_secs(1800));
        assert_eq!(config.inventory_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_clamp_within_bounds_is_identity() {
        let config = Config::default();
        assert_eq!(config.clamped_reminder_delay(), Duration::from_secs(1800));
    }

    #[test]
    fn test_clamp_applies_bounds() {
        let mut config = Config::default();

        config.reminder_delay = Duration::from_secs(1);
        assert_eq!(config.clamped_reminder_delay(), config.reminder_delay_min);

        config.reminder_delay = Duration::from_secs(1_000_000);
        assert_eq!(config.clamped_reminder_delay(), config.reminder_delay_max);
    }
}
