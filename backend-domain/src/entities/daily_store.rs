// Daily store entity
// date -> tag -> records, persisted as a single JSON document

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entities::Record;

pub type TagRecords = BTreeMap<String, Vec<Record>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyStore {
    days: BTreeMap<NaiveDate, TagRecords>,
}

impl DailyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn record_count(&self) -> usize {
        self.days
            .values()
            .flat_map(|tags| tags.values())
            .map(Vec::len)
            .sum()
    }

    pub fn dates(&self) -> impl DoubleEndedIterator<Item = &NaiveDate> {
        self.days.keys()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Date entries with `start <= date <= end`, in date order.
    pub fn days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = (&NaiveDate, &TagRecords)> {
        (start <= end)
            .then(|| self.days.range(start..=end))
            .into_iter()
            .flatten()
    }

    pub fn day(&self, date: &NaiveDate) -> Option<&TagRecords> {
        self.days.get(date)
    }

    pub fn records(&self, date: &NaiveDate, tag: &str) -> Option<&[Record]> {
        self.days
            .get(date)
            .and_then(|tags| tags.get(tag))
            .map(Vec::as_slice)
    }

    /// Replaces the whole record list stored under `(date, tag)`.
    pub fn upsert(&mut self, date: NaiveDate, tag: &str, records: Vec<Record>) -> Option<Vec<Record>> {
        self.days
            .entry(date)
            .or_default()
            .insert(tag.to_string(), records)
    }

    /// Removes one `(date, tag)` upload; the date disappears once it has no tags left.
    pub fn remove(&mut self, date: &NaiveDate, tag: &str) -> Option<Vec<Record>> {
        let tags = self.days.get_mut(date)?;
        let removed = tags.remove(tag);
        if tags.is_empty() {
            self.days.remove(date);
        }
        removed
    }

    /// Dates present in `[start, end]`; days without data are simply absent.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> DailyStore {
        if start > end {
            return DailyStore::new();
        }
        let days = self
            .days
            .range(start..=end)
            .map(|(date, tags)| (*date, tags.clone()))
            .collect();
        DailyStore { days }
    }

    /// Drops every date strictly older than `cutoff`, returning what was removed.
    pub fn retain_since(&mut self, cutoff: NaiveDate) -> Vec<NaiveDate> {
        let kept = self.days.split_off(&cutoff);
        let removed = std::mem::replace(&mut self.days, kept);
        removed.into_keys().collect()
    }
}

pub fn retention_cutoff(today: NaiveDate, retention_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(retention_days)))
        .unwrap_or(NaiveDate::MIN)
}
