//! Summary configuration

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_COMORBIDITY_CAP: usize = 6;
pub const DEFAULT_SHARD_SIZE: usize = 1024;
/// Largest accepted `comorbidity_cap`; the cross table allocates one column per
/// count up to the cap.
pub const MAX_COMORBIDITY_CAP: usize = 100;

/// A configuration value the builder cannot work with.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("comorbidity_cap must be at most {max}, got {cap}")]
    ComorbidityCapTooLarge { cap: usize, max: usize },
    #[display("shard_size must be at least 1")]
    ZeroShardSize,
}

/// Knobs of [`SummaryBuilder`](crate::summary::SummaryBuilder).
///
/// Missing fields take their default when deserialized, so a JSON file only
/// needs to list what it changes:
///
/// ```
/// use medsum_analysis::config::SummaryConfig;
///
/// let config: SummaryConfig = serde_json::from_str(r#"{ "top_k": 5 }"#).unwrap();
/// assert_eq!(config.top_k, 5);
/// assert_eq!(config.comorbidity_cap, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Number of diagnoses kept in the frequency ranking
    pub top_k: usize,
    /// Last column of the age × comorbidity table; larger counts are clamped
    pub comorbidity_cap: usize,
    /// Aggregate shards on the rayon thread pool
    pub parallel: bool,
    /// Records per shard when `parallel` is set
    pub shard_size: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            comorbidity_cap: DEFAULT_COMORBIDITY_CAP,
            parallel: false,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }
}

impl SummaryConfig {
    /// Checks that every value is usable by the builder.
    ///
    /// ```
    /// use medsum_analysis::config::{ConfigError, SummaryConfig};
    ///
    /// assert!(SummaryConfig::default().validate().is_ok());
    /// let config = SummaryConfig { shard_size: 0, ..SummaryConfig::default() };
    /// assert_eq!(config.validate(), Err(ConfigError::ZeroShardSize));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.comorbidity_cap > MAX_COMORBIDITY_CAP {
            return Err(ConfigError::ComorbidityCapTooLarge {
                cap: self.comorbidity_cap,
                max: MAX_COMORBIDITY_CAP,
            });
        }
        if self.shard_size == 0 {
            return Err(ConfigError::ZeroShardSize);
        }
        Ok(())
    }
}
