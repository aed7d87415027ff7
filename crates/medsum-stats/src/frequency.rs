//! Occurrence counting and top-K ranking
//!
//! Ranking order is count descending; items with equal counts are ordered by the
//! position of their first occurrence in the input, earliest first. The tie-break
//! never depends on hashing or on the ordering of the items themselves, so the
//! ranking is fully determined by the input sequence.
//!
//! # Sharded counting
//!
//! A [`FrequencyTable`] built from a shard of a larger sequence must record the
//! *global* position of each item, otherwise the first-occurrence tie-break would
//! be evaluated per shard. Use [`FrequencyTable::push_at`] with
//! `shard_offset + local_index` and combine the shards with
//! [`FrequencyTable::merge`]:
//!
//! ```
//! use medsum_stats::frequency::FrequencyTable;
//!
//! let items = ["b", "a", "a", "b", "c"];
//! let (left, right) = items.split_at(2);
//!
//! let mut merged = FrequencyTable::new();
//! for (i, item) in left.iter().enumerate() {
//!     merged.push_at(*item, i);
//! }
//! let mut shard = FrequencyTable::new();
//! for (i, item) in right.iter().enumerate() {
//!     shard.push_at(*item, left.len() + i);
//! }
//! merged.merge(shard);
//!
//! assert_eq!(merged, FrequencyTable::from_items(items));
//! ```

use std::{borrow::Borrow, collections::BTreeMap};

use serde::Serialize;

/// An item together with the number of times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedItem<K> {
    pub item: K,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Occurrence {
    count: usize,
    first_position: usize,
}

/// Occurrence counts of distinct items, remembering where each was first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K> {
    entries: BTreeMap<K, Occurrence>,
    next_position: usize,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_position: 0,
        }
    }
}

impl<K> FrequencyTable<K>
where
    K: Ord + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every item of `items`, positions taken from iteration order.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut table = Self::new();
        for item in items {
            table.push(item);
        }
        table
    }

    /// Counts `item` at the position following the last one recorded.
    pub fn push(&mut self, item: K) {
        self.push_at(item, self.next_position);
    }

    /// Counts `item` as occurring at the global sequence `position`.
    pub fn push_at(&mut self, item: K, position: usize) {
        let occurrence = self.entries.entry(item).or_insert(Occurrence {
            count: 0,
            first_position: position,
        });
        occurrence.count += 1;
        occurrence.first_position = occurrence.first_position.min(position);
        self.next_position = self.next_position.max(position + 1);
    }

    /// Adds the counts of `other`, keeping the earliest first position per item.
    pub fn merge(&mut self, other: Self) {
        for (item, theirs) in other.entries {
            self.entries
                .entry(item)
                .and_modify(|ours| {
                    ours.count += theirs.count;
                    ours.first_position = ours.first_position.min(theirs.first_position);
                })
                .or_insert(theirs);
        }
        self.next_position = self.next_position.max(other.next_position);
    }

    /// Number of occurrences of `item`, `0` if it was never seen.
    #[must_use]
    pub fn count<Q>(&self, item: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(item).map_or(0, |occurrence| occurrence.count)
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of occurrences of all items.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.values().map(|occurrence| occurrence.count).sum()
    }

    /// Returns at most `k` items ordered by count descending, then by first
    /// occurrence ascending.
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_stats::frequency::FrequencyTable;
    ///
    /// let table = FrequencyTable::from_items(["c", "b", "a", "b"]);
    /// let top = table.top_k(10);
    /// let items = top.iter().map(|r| r.item).collect::<Vec<_>>();
    /// assert_eq!(items, ["b", "c", "a"]);
    /// assert!(table.top_k(0).is_empty());
    /// ```
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<RankedItem<K>> {
        let mut ranked = self.entries.iter().collect::<Vec<_>>();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then(a.first_position.cmp(&b.first_position))
        });
        ranked
            .into_iter()
            .take(k)
            .map(|(item, occurrence)| RankedItem {
                item: item.clone(),
                count: occurrence.count,
            })
            .collect()
    }
}

/// Counts `items` and returns the `top_k` most frequent ones.
///
/// A `top_k` of zero yields an empty ranking; a `top_k` larger than the number of
/// distinct items yields all of them.
#[must_use]
pub fn rank<I>(items: I, top_k: usize) -> Vec<RankedItem<I::Item>>
where
    I: IntoIterator,
    I::Item: Ord + Clone,
{
    FrequencyTable::from_items(items).top_k(top_k)
}
