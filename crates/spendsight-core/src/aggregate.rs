//! Bucket aggregation
//!
//! Sums, counts and averages keyed by day, week, month, category or weekday.
//! [`BucketMap`] keeps keys in first-insertion order so that "first
//! encountered wins" tie breaks and rendered output are deterministic.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::models::TransactionRecord;

/// Running total and count for one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bucket {
    pub total: f64,
    pub count: usize,
}

impl Bucket {
    pub fn add(&mut self, amount: f64) {
        self.total += amount.abs();
        self.count += 1;
    }

    /// Mean amount per record; 0 for an empty bucket
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Insertion-ordered map of buckets with unique keys
#[derive(Debug, Clone)]
pub struct BucketMap<K> {
    entries: Vec<(K, Bucket)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Default for BucketMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> BucketMap<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Pre-seed empty buckets in the given order
    pub fn with_keys<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut map = Self::new();
        for key in keys {
            map.slot(key);
        }
        map
    }

    fn slot(&mut self, key: K) -> &mut Bucket {
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                self.entries.push((key.clone(), Bucket::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    /// Add the magnitude of `amount` to `key`, creating the bucket if needed
    pub fn add(&mut self, key: K, amount: f64) {
        self.slot(key).add(amount);
    }

    pub fn get(&self, key: &K) -> Option<&Bucket> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Bucket)> {
        self.entries.iter().map(|(k, b)| (k, b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn grand_total(&self) -> f64 {
        self.entries.iter().map(|(_, b)| b.total).sum()
    }

    pub fn into_vec(self) -> Vec<(K, Bucket)> {
        self.entries
    }
}

/// Group records by a derived key, preserving first-seen key order
pub fn group_by<'a, K, F>(
    records: &[&'a TransactionRecord],
    key_fn: F,
) -> Vec<(K, Vec<&'a TransactionRecord>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&TransactionRecord) -> K,
{
    let mut groups: Vec<(K, Vec<&'a TransactionRecord>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for &record in records {
        let key = key_fn(record);
        match index.get(&key) {
            Some(&pos) => groups[pos].1.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }
    groups
}

/// Collapse grouped records into totals and counts
pub fn sum_by_bucket<'a, K, I, V>(buckets: I) -> BucketMap<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, V)>,
    V: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut map = BucketMap::new();
    for (key, records) in buckets {
        let bucket = map.slot(key);
        for record in records {
            bucket.add(record.amount);
        }
    }
    map
}

/// Total amount per category name, first-seen order
pub fn by_category(records: &[&TransactionRecord]) -> BucketMap<String> {
    let mut map = BucketMap::new();
    for record in records {
        map.add(record.category_name.clone(), record.amount);
    }
    map
}

/// Key with the strictly greatest positive selector value
///
/// Ties keep the first-encountered key. Returns `None` when no bucket has a
/// positive value.
pub fn top_by<'m, K, F>(map: &'m BucketMap<K>, selector: F) -> Option<(&'m K, f64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Bucket) -> f64,
{
    let mut best: Option<(&K, f64)> = None;
    for (key, bucket) in map.iter() {
        let value = selector(bucket);
        let current = best.map(|(_, v)| v).unwrap_or(0.0);
        if value > current {
            best = Some((key, value));
        }
    }
    best
}

pub fn total_amount(records: &[&TransactionRecord]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}

/// Round half away from negative infinity (`Math.round` semantics)
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}

/// `part / whole * 100`, 0 when `whole` is not positive
pub fn safe_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, amount: f64, category: &str) -> TransactionRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        TransactionRecord::new(id, ts, amount).with_category(category)
    }

    #[test]
    fn test_empty_bucket_average_is_zero() {
        let bucket = Bucket::default();
        assert_eq!(bucket.average(), 0.0);
        assert!(!bucket.average().is_nan());
    }

    #[test]
    fn test_bucket_map_keeps_insertion_order() {
        let mut map = BucketMap::new();
        map.add("b", 10.0);
        map.add("a", 5.0);
        map.add("b", -20.0);

        let keys: Vec<&&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&"b", &"a"]);
        assert_eq!(map.get(&"b").unwrap().total, 30.0);
        assert_eq!(map.get(&"b").unwrap().count, 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_with_keys_seeds_zero_buckets() {
        let map = BucketMap::with_keys(vec!["x", "y", "x"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"y").unwrap().count, 0);
        assert_eq!(map.grand_total(), 0.0);
    }

    #[test]
    fn test_top_by_first_wins_ties() {
        let mut map = BucketMap::new();
        map.add("first", 100.0);
        map.add("second", 100.0);
        map.add("third", 50.0);

        let (key, value) = top_by(&map, |b| b.total).unwrap();
        assert_eq!(*key, "first");
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_top_by_average_vs_total() {
        let mut map = BucketMap::new();
        // Many small purchases: larger total, smaller average
        for _ in 0..10 {
            map.add("groceries", 30.0);
        }
        map.add("electronics", 200.0);

        assert_eq!(*top_by(&map, |b| b.total).unwrap().0, "groceries");
        assert_eq!(*top_by(&map, |b| b.average()).unwrap().0, "electronics");
    }

    #[test]
    fn test_top_by_none_when_nothing_positive() {
        let map: BucketMap<&str> = BucketMap::with_keys(vec!["a", "b"]);
        assert!(top_by(&map, |b| b.total).is_none());
    }

    #[test]
    fn test_group_and_sum_match_total() {
        let records = [
            record("1", 10.0, "Food"),
            record("2", 25.5, "Transport"),
            record("3", 4.5, "Food"),
        ];
        let refs: Vec<&TransactionRecord> = records.iter().collect();

        let groups = group_by(&refs, |r| r.category_name.clone());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Food");
        assert_eq!(groups[0].1.len(), 2);

        let sums = sum_by_bucket(groups);
        assert_eq!(sums.get(&"Transport".to_string()).unwrap().total, 25.5);
        assert_eq!(sums.grand_total(), 40.0);

        let map = by_category(&refs);
        assert_eq!(map.grand_total(), total_amount(&refs));
        assert_eq!(map.get(&"Food".to_string()).unwrap().total, 14.5);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(f64::NAN), 0);
    }

    #[test]
    fn test_safe_percent() {
        assert_eq!(safe_percent(50.0, 200.0), 25.0);
        assert_eq!(safe_percent(50.0, 0.0), 0.0);
    }
}
