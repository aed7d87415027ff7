//! Aggregation primitives for descriptive summaries.
//!
//! This crate is domain-free: it knows nothing about patients, only about items,
//! keys and counts. It provides:
//!
//! - **Grouped reduction**: count and arithmetic mean of a value per key
//! - **Frequency ranking**: top-K items by occurrence with a deterministic tie-break
//! - **Cross-tabulation**: 2D count matrices with a clamped column dimension
//! - **Descriptive statistics**: min/max/mean/median/std-dev and zero-safe ratios
//!
//! Every accumulator in this crate can be merged with another accumulator of the
//! same kind, so callers may split their input into shards, aggregate each shard
//! independently and combine the partial results.
//!
//! # Modules
//!
//! - [`group`]: Group-by reduction into [`group::GroupStats`]
//! - [`frequency`]: Occurrence counting and top-K ranking
//! - [`crosstab`]: Two-dimensional contingency tables
//! - [`descriptive`]: Descriptive statistics and zero-denominator helpers
//!
//! # Examples
//!
//! ## Grouped means
//!
//! ```
//! use medsum_stats::group::GroupedStats;
//!
//! let items = [("a", 1.0), ("b", 4.0), ("a", 3.0)];
//! let stats = GroupedStats::collect_by_group(&items, |(k, _)| *k, |(_, v)| *v);
//! assert_eq!(stats.get(&"a").unwrap().count, 2);
//! assert_eq!(stats.mean(&"a"), 2.0);
//! assert_eq!(stats.mean(&"missing"), 0.0);
//! ```
//!
//! ## Ranking by frequency
//!
//! ```
//! use medsum_stats::frequency;
//!
//! let ranked = frequency::rank(["x", "y", "y", "x", "z"], 2);
//! assert_eq!(ranked[0].item, "x");
//! assert_eq!(ranked[1].item, "y");
//! ```
//!
//! ## Cross-tabulation
//!
//! ```
//! use medsum_stats::crosstab::CrossTab;
//!
//! let items = [(0, 1), (1, 9), (1, 2)];
//! let table = CrossTab::from_items(&items, 2, 3, |(r, _)| *r, |(_, c)| *c);
//! assert_eq!(table.get(1, 3), 1); // 9 clamps into the last column
//! assert_eq!(table.total(), 3);
//! ```

pub mod crosstab;
pub mod descriptive;
pub mod frequency;
pub mod group;
