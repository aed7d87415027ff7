//! Group-by reduction
//!
//! Groups items by a key and reduces every group to a count and the arithmetic
//! mean of a per-item value.
//!
//! Keys are stored in a [`BTreeMap`], so iteration order depends only on the keys
//! themselves and never on the order the items were seen in. Values are summed in
//! the order they are pushed; callers that want bit-reproducible means should push
//! items in input order.
//!
//! Only keys that were observed appear in the result. When a caller needs every
//! key of a closed domain (for example all age buckets, even empty ones), it
//! should start from [`GroupedStats::with_keys`].

use std::{borrow::Borrow, collections::BTreeMap};

use serde::Serialize;

use crate::descriptive;

/// Count and running sum of the values of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of items in the group
    pub count: usize,
    /// Sum of the values of all items in the group
    pub sum: f64,
}

impl GroupStats {
    /// Adds one value to the group.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Adds the contents of another group to this one.
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
    }

    /// Arithmetic mean of the group, `0.0` for an empty group.
    #[must_use]
    pub fn mean(&self) -> f64 {
        descriptive::mean_or_zero(self.sum, self.count)
    }
}

/// Per-key [`GroupStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedStats<K> {
    pub map: BTreeMap<K, GroupStats>,
}

impl<K> Default for GroupedStats<K> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<K> GroupedStats<K>
where
    K: Ord,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapping pre-seeded with zero-count entries for `keys`.
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_stats::group::GroupedStats;
    ///
    /// let stats = GroupedStats::<u8>::with_keys([1, 2, 3]);
    /// assert_eq!(stats.map.len(), 3);
    /// assert_eq!(stats.total_count(), 0);
    /// assert_eq!(stats.mean(&2), 0.0);
    /// ```
    #[must_use]
    pub fn with_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            map: keys
                .into_iter()
                .map(|key| (key, GroupStats::default()))
                .collect(),
        }
    }

    /// Groups `items` by `key` and reduces each group over `value`.
    ///
    /// # Arguments
    ///
    /// * `items` - Items to group, visited in slice order
    /// * `key` - Closure computing the group key of an item
    /// * `value` - Closure computing the value averaged within the group
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_stats::group::GroupedStats;
    ///
    /// let words = ["apple", "avocado", "banana"];
    /// let by_initial = GroupedStats::collect_by_group(
    ///     &words,
    ///     |w| w.chars().next(),
    ///     |w| w.len() as f64,
    /// );
    /// assert_eq!(by_initial.mean(&Some('a')), 6.0);
    /// assert_eq!(by_initial.get(&Some('b')).unwrap().count, 1);
    /// ```
    pub fn collect_by_group<T, F, V>(items: &[T], mut key: F, mut value: V) -> Self
    where
        F: FnMut(&T) -> K,
        V: FnMut(&T) -> f64,
    {
        let mut stats = Self::new();
        for item in items {
            stats.push(key(item), value(item));
        }
        stats
    }

    /// Adds one value under `key`.
    pub fn push(&mut self, key: K, value: f64) {
        self.map.entry(key).or_default().push(value);
    }

    /// Adds every group of `other` into this mapping.
    pub fn merge(&mut self, other: Self) {
        for (key, stats) in other.map {
            self.map.entry(key).or_default().merge(&stats);
        }
    }

    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&GroupStats>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.get(key)
    }

    /// Mean of the group under `key`, `0.0` if the key is absent or empty.
    #[must_use]
    pub fn mean<Q>(&self, key: &Q) -> f64
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).map_or(0.0, GroupStats::mean)
    }

    /// Total number of items across all groups.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.map.values().map(|stats| stats.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &GroupStats)> {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_mean_is_zero() {
        let stats = GroupStats::default();
        assert_eq!(stats.count, 0);
        assert!(stats.mean().abs() < f64::EPSILON);
        assert!(!stats.mean().is_nan());
    }

    #[test]
    fn test_collect_by_group_counts_and_means() {
        let items = [("x", 1.0), ("y", 10.0), ("x", 2.0), ("x", 3.0)];
        let stats = GroupedStats::collect_by_group(&items, |(k, _)| *k, |(_, v)| *v);

        assert_eq!(stats.map.len(), 2);
        assert_eq!(stats.get("x").unwrap().count, 3);
        assert!((stats.mean("x") - 2.0).abs() < f64::EPSILON);
        assert!((stats.mean("y") - 10.0).abs() < f64::EPSILON);
        assert_eq!(stats.total_count(), 4);
    }

    #[test]
    fn test_only_observed_keys_are_reported() {
        let items = [1_u32, 1, 3];
        let stats = GroupedStats::collect_by_group(&items, |v| *v, |_| 1.0);
        assert!(stats.get(&2).is_none());
        assert!(stats.mean(&2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_keys_keeps_empty_groups() {
        let mut stats = GroupedStats::with_keys(["a", "b", "c"]);
        stats.push("b", 4.0);

        let keys = stats.iter().map(|(k, _)| *k).collect::<Vec<_>>();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(stats.get("a").unwrap().count, 0);
        assert!(stats.mean("a").abs() < f64::EPSILON);
        assert!((stats.mean("b") - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_result_is_independent_of_input_order() {
        let forward = [("a", 1.0), ("b", 2.0), ("a", 5.0), ("c", 0.0)];
        let mut backward = forward;
        backward.reverse();

        let lhs = GroupedStats::collect_by_group(&forward, |(k, _)| *k, |(_, v)| *v);
        let rhs = GroupedStats::collect_by_group(&backward, |(k, _)| *k, |(_, v)| *v);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let items = [("a", 1.0), ("b", 2.0), ("a", 3.0), ("b", 6.0), ("c", 1.0)];
        let whole = GroupedStats::collect_by_group(&items, |(k, _)| *k, |(_, v)| *v);

        let (left, right) = items.split_at(2);
        let mut merged = GroupedStats::collect_by_group(left, |(k, _)| *k, |(_, v)| *v);
        merged.merge(GroupedStats::collect_by_group(right, |(k, _)| *k, |(_, v)| *v));

        assert_eq!(whole, merged);
    }
}
