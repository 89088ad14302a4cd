use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// Metered AI features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaKind {
    EmailDraft,
    ChatMessage,
}

impl QuotaKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuotaKind::EmailDraft => "email drafts",
            QuotaKind::ChatMessage => "chat messages",
        }
    }
}

/// Usage for one member and feature on one UTC day.
#[derive(Debug)]
struct DailyCounter {
    day: NaiveDate,
    used: u32,
}

impl DailyCounter {
    fn new(day: NaiveDate) -> Self {
        DailyCounter { day, used: 0 }
    }

    fn try_consume(&mut self, today: NaiveDate, limit: u32) -> Option<u32> {
        if self.day != today {
            self.day = today;
            self.used = 0;
        }
        if self.used >= limit {
            return None;
        }
        self.used += 1;
        Some(limit - self.used)
    }
}

type Key = (Uuid, QuotaKind);

/// Per-member daily counters. Counts reset at UTC midnight and are lost on restart.
#[derive(Clone, Default)]
pub struct UsageQuotaStore {
    map: Arc<DashMap<Key, Arc<Mutex<DailyCounter>>>>,
}

impl UsageQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, key: Key, today: NaiveDate) -> Arc<Mutex<DailyCounter>> {
        if let Some(existing) = self.map.get(&key) {
            return existing.clone();
        }
        match self.map.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let counter = Arc::new(Mutex::new(DailyCounter::new(today)));
                entry.insert(counter.clone());
                counter
            }
        }
    }

    /// Records one use. Returns the uses left today, or `None` when the
    /// limit was already reached.
    pub fn try_consume(&self, user_id: Uuid, kind: QuotaKind, limit: u32) -> Option<u32> {
        self.try_consume_on(user_id, kind, limit, Utc::now().date_naive())
    }

    fn try_consume_on(&self, user_id: Uuid, kind: QuotaKind, limit: u32, today: NaiveDate) -> Option<u32> {
        let counter = self.counter((user_id, kind), today);
        let mut counter = counter.lock();
        counter.try_consume(today, limit)
    }

    pub fn used_today(&self, user_id: Uuid, kind: QuotaKind) -> u32 {
        let today = Utc::now().date_naive();
        self.map
            .get(&(user_id, kind))
            .map(|c| {
                let c = c.lock();
                if c.day == today { c.used } else { 0 }
            })
            .unwrap_or(0)
    }

    /// Drops counters from previous days.
    pub fn evict_stale(&self) -> usize {
        self.evict_before(Utc::now().date_naive())
    }

    fn evict_before(&self, today: NaiveDate) -> usize {
        let stale: Vec<Key> = self
            .map
            .iter()
            .filter(|entry| entry.value().lock().day < today)
            .map(|entry| *entry.key())
            .collect();

        for key in &stale {
            self.map.remove(key);
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn limit_is_enforced_per_member_and_kind() {
        let store = UsageQuotaStore::new();
        let jordan = Uuid::new_v4();
        let priya = Uuid::new_v4();

        assert_eq!(store.try_consume_on(jordan, QuotaKind::EmailDraft, 2, day(1)), Some(1));
        assert_eq!(store.try_consume_on(jordan, QuotaKind::EmailDraft, 2, day(1)), Some(0));
        assert_eq!(store.try_consume_on(jordan, QuotaKind::EmailDraft, 2, day(1)), None);

        assert_eq!(store.try_consume_on(jordan, QuotaKind::ChatMessage, 2, day(1)), Some(1));
        assert_eq!(store.try_consume_on(priya, QuotaKind::EmailDraft, 2, day(1)), Some(1));
    }

    #[test]
    fn counter_resets_on_a_new_day() {
        let store = UsageQuotaStore::new();
        let jordan = Uuid::new_v4();

        assert_eq!(store.try_consume_on(jordan, QuotaKind::EmailDraft, 1, day(1)), Some(0));
        assert_eq!(store.try_consume_on(jordan, QuotaKind::EmailDraft, 1, day(1)), None);
        assert_eq!(store.try_consume_on(jordan, QuotaKind::EmailDraft, 1, day(2)), Some(0));
    }

    #[test]
    fn stale_counters_are_evicted() {
        let store = UsageQuotaStore::new();
        store.try_consume_on(Uuid::new_v4(), QuotaKind::EmailDraft, 5, day(1));
        store.try_consume_on(Uuid::new_v4(), QuotaKind::ChatMessage, 5, day(2));

        assert_eq!(store.evict_before(day(2)), 1);
        assert_eq!(store.len(), 1);
    }
}
