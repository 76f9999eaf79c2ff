//! Daily-sequence order id generation.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use common::OrderId;

#[derive(Debug)]
struct DayState {
    day: Option<NaiveDate>,
    seq: u32,
}

/// Generates order ids of the form `DDMMYYYY-NN`.
///
/// The sequence increments under a lock and resets when the calendar day
/// changes, so no two orders created on the same day share an id.
#[derive(Debug, Clone)]
pub struct OrderIdGenerator {
    state: Arc<Mutex<DayState>>,
}

impl OrderIdGenerator {
    /// Creates a new generator with an empty sequence.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DayState { day: None, seq: 0 })),
        }
    }

    /// Generates the next id for today.
    pub fn next(&self) -> OrderId {
        self.next_for(Utc::now().date_naive())
    }

    /// Generates the next id for the given day.
    ///
    /// A day different from the last one seen resets the sequence.
    pub fn next_for(&self, day: NaiveDate) -> OrderId {
        let mut state = self.state.lock().unwrap();
        if state.day != Some(day) {
            state.day = Some(day);
            state.seq = 0;
        }
        state.seq += 1;
        OrderId::new(format!("{}-{:02}", day.format("%d%m%Y"), state.seq))
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_id_format() {
        let generator = OrderIdGenerator::new();
        let id = generator.next_for(day(2026, 8, 6));
        assert_eq!(id.as_str(), "06082026-01");
    }

    #[test]
    fn test_sequence_increments_within_a_day() {
        let generator = OrderIdGenerator::new();
        let d = day(2026, 8, 6);
        let ids: Vec<_> = (0..12).map(|_| generator.next_for(d)).collect();

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id.as_str(), format!("06082026-{:02}", i + 1));
        }

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_sequence_resets_on_new_day() {
        let generator = OrderIdGenerator::new();
        generator.next_for(day(2026, 8, 6));
        generator.next_for(day(2026, 8, 6));

        let id = generator.next_for(day(2026, 8, 7));
        assert_eq!(id.as_str(), "07082026-01");
    }

    #[test]
    fn test_clones_share_the_sequence() {
        let generator = OrderIdGenerator::new();
        let clone = generator.clone();
        let d = day(2026, 8, 6);

        assert_eq!(generator.next_for(d).as_str(), "06082026-01");
        assert_eq!(clone.next_for(d).as_str(), "06082026-02");
    }
}
